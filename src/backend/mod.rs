//! Backend layer: the platform API the console reads from and forwards
//! review decisions to.
//!
//! [`RecordBackend`] is the seam between the gateway and the platform. The
//! gateway never owns record state; every call goes to the backend.
//! [`HttpBackend`] talks to the real platform over HTTP, while
//! [`InMemoryBackend`] serves a seeded fixture for demos and tests.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{CanonicalStatus, RecordKind};

pub use http::HttpBackend;
pub use memory::InMemoryBackend;

/// Failure talking to the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("backend unreachable: {0}")]
    Transport(String),

    /// The backend answered 404.
    #[error("not found")]
    NotFound,

    /// The backend refused a mutation (validation, already terminal).
    /// `message` is the backend's own text, or a generic fallback.
    #[error("{message}")]
    Rejected {
        /// HTTP status the backend answered with.
        status: u16,
        /// Message to show the operator.
        message: String,
    },

    /// Any other non-success answer.
    #[error("backend answered HTTP {status}: {message}")]
    Status {
        /// HTTP status the backend answered with.
        status: u16,
        /// Message extracted from the body.
        message: String,
    },

    /// The configured base URL cannot address records.
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),

    /// The backend answered with a body that is not JSON.
    #[error("undecodable backend payload: {0}")]
    Decode(String),
}

/// Read / write access to the platform's records.
///
/// Implementations return raw JSON; normalization happens in the domain
/// layer so every backend shares one mapping.
#[async_trait]
pub trait RecordBackend: Send + Sync + std::fmt::Debug {
    /// Fetches the full raw collection for `kind`, envelope removed.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the collection cannot be fetched.
    async fn fetch_collection(&self, kind: RecordKind) -> Result<Vec<Value>, BackendError>;

    /// Fetches one raw record. `Ok(None)` when the backend does not know
    /// the id.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] on transport or payload failures.
    async fn fetch_record(&self, kind: RecordKind, id: &str)
    -> Result<Option<Value>, BackendError>;

    /// Asks the backend to move a record to `target`.
    ///
    /// Not idempotent: callers must not retry on failure.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Rejected`] when the backend refuses the
    /// transition, [`BackendError::NotFound`] for unknown ids, and other
    /// variants for transport failures.
    async fn transition_status(
        &self,
        kind: RecordKind,
        id: &str,
        target: &CanonicalStatus,
        reason: Option<&str>,
    ) -> Result<(), BackendError>;
}
