//! Domain events announcing acknowledged status transitions.
//!
//! The gateway keeps no record state, so the only thing worth telling
//! other consoles is that a backend-acknowledged transition happened and
//! their copy of the collection is stale.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{CanonicalStatus, RecordKind};

/// Event broadcast through the [`super::EventBus`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum RecordEvent {
    /// The backend acknowledged a status transition.
    StatusChanged {
        /// Kind of the transitioned record.
        kind: RecordKind,
        /// Record identifier.
        record_id: String,
        /// Status the record was moved to.
        status: CanonicalStatus,
        /// Reason sent along with the request, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        /// Acknowledgement timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl RecordEvent {
    /// Returns the record kind associated with this event.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::StatusChanged { kind, .. } => *kind,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::StatusChanged { .. } => "status_changed",
        }
    }
}
