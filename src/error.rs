//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::backend::BackendError;
use crate::domain::RecordKind;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2002,
///     "message": "withdrawal already processed",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see the ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Backend call a [`BackendError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall<'a> {
    /// Whole-collection fetch.
    Collection,
    /// Single-record fetch.
    Record(&'a str),
    /// Status transition of one record.
    Transition(&'a str),
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server/Upstream | 500 / 502 Bad Gateway        |
/// | 4000–4999 | Kind-Specific   | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown record kind in the path.
    #[error("invalid record kind: {0}")]
    InvalidRecordKind(String),

    /// The backend has no record with this id.
    #[error("{kind} {id} not found")]
    RecordNotFound {
        /// Kind that was looked up.
        kind: RecordKind,
        /// Identifier that was looked up.
        id: String,
    },

    /// The backend refused a status transition. Carries the backend's
    /// message verbatim.
    #[error("{0}")]
    TransitionRejected(String),

    /// Records of this kind cannot be reviewed.
    #[error("{0} records do not support status transitions")]
    TransitionUnsupported(RecordKind),

    /// The backend could not be reached or answered with something
    /// unusable.
    #[error("backend error: {0}")]
    Backend(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Maps a backend failure onto the gateway taxonomy. Only a refused
    /// transition becomes [`GatewayError::TransitionRejected`]; a refused
    /// read of one record is the caller's bad request.
    #[must_use]
    pub fn from_backend(err: BackendError, kind: RecordKind, call: BackendCall<'_>) -> Self {
        match (err, call) {
            (BackendError::NotFound, BackendCall::Record(id) | BackendCall::Transition(id)) => {
                Self::RecordNotFound {
                    kind,
                    id: id.to_string(),
                }
            }
            (BackendError::Rejected { message, .. }, BackendCall::Transition(_)) => {
                Self::TransitionRejected(message)
            }
            (
                BackendError::Rejected {
                    status: 400 | 422,
                    message,
                },
                BackendCall::Record(_),
            ) => Self::InvalidRequest(message),
            (other, _) => Self::Backend(other.to_string()),
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidRecordKind(_) => 1002,
            Self::RecordNotFound { .. } => 2001,
            Self::TransitionRejected(_) => 2002,
            Self::Internal(_) => 3000,
            Self::Backend(_) => 3002,
            Self::TransitionUnsupported(_) => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidRecordKind(_) => StatusCode::BAD_REQUEST,
            Self::RecordNotFound { .. } => StatusCode::NOT_FOUND,
            Self::TransitionRejected(_) => StatusCode::CONFLICT,
            Self::TransitionUnsupported(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
