//! Canonical view-model record shared by every list page.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use super::record_kind::SearchField;
use super::{CanonicalStatus, RecordKind};

/// Flat, type-stable record produced by [`super::normalize::normalize_record`].
///
/// Every field holds a defined value: missing text is the empty string,
/// missing amounts are `0.0` and a missing status is
/// [`CanonicalStatus::Unknown`]. Presentation code never has to look at the
/// raw backend shape.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Record {
    /// Backend identifier (numeric ids are rendered as strings).
    pub id: String,
    /// Kind of record.
    pub kind: RecordKind,
    /// Monetary amount.
    pub amount: f64,
    /// Currency or asset code, upper-cased.
    pub currency: String,
    /// Canonical status.
    #[schema(value_type = String)]
    pub status: CanonicalStatus,
    /// Status exactly as the backend spelled it (trimmed).
    pub raw_status: String,
    /// Primary timestamp, serialized as RFC 3339 or `""` when unknown.
    #[serde(serialize_with = "serialize_timestamp")]
    #[schema(value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
    /// Owning user's identifier.
    pub user_id: String,
    /// Owning user's display name.
    pub user_name: String,
    /// Owning user's email.
    pub user_email: String,
    /// Transaction id / hash.
    pub tx_id: String,
    /// Type, method or category, lower-cased.
    pub category: String,
    /// Title (news posts).
    pub title: String,
    /// Reason, note or comment attached by the backend.
    pub note: String,
}

impl Record {
    /// Returns the value of a searchable field.
    #[must_use]
    pub fn search_value(&self, field: SearchField) -> &str {
        match field {
            SearchField::Id => &self.id,
            SearchField::UserName => &self.user_name,
            SearchField::UserEmail => &self.user_email,
            SearchField::TxId => &self.tx_id,
            SearchField::Title => &self.title,
        }
    }
}

fn serialize_timestamp<S: Serializer>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => serializer.serialize_str(""),
    }
}
