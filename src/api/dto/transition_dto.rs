//! Review (status transition) DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Record, RecordKind};
use crate::service::TransitionOutcome;

/// Request body for `POST /records/{kind}/{id}/approve`. May be omitted.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ApproveRequest {
    /// Optional note stored with the decision.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for `POST /records/{kind}/{id}/reject`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectRequest {
    /// Why the record is rejected. Required and non-blank.
    pub reason: String,
}

/// Request body for `POST /records/{kind}/{id}/transition`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// Target status: `approve`/`approved` or `reject`/`rejected`, any case.
    pub status: String,
    /// Optional reason / note / proof reference.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Response body for every transition endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransitionResponse {
    /// Kind of the transitioned record.
    pub kind: RecordKind,
    /// Record identifier.
    pub record_id: String,
    /// Status the backend acknowledged.
    pub status: String,
    /// The record as re-fetched after acknowledgement, when available.
    pub record: Option<Record>,
    /// Acknowledgement timestamp.
    pub transitioned_at: DateTime<Utc>,
}

impl From<TransitionOutcome> for TransitionResponse {
    fn from(outcome: TransitionOutcome) -> Self {
        Self {
            kind: outcome.kind,
            record_id: outcome.record_id,
            status: outcome.status.as_str().to_string(),
            record: outcome.record,
            transitioned_at: Utc::now(),
        }
    }
}
