//! Canonical status vocabulary and raw-status canonicalization.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// UI-facing status a raw backend status string is mapped onto.
///
/// Backends spell the same state differently (`"COMPLETED"`, `"approved"`,
/// `"Pending review"`). [`CanonicalStatus::canonicalize`] folds them into
/// this fixed vocabulary; values outside it pass through lower-cased as
/// [`CanonicalStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalStatus {
    /// Awaiting review.
    Pending,
    /// Approved or completed.
    Approved,
    /// Rejected.
    Rejected,
    /// Backend sent no status at all.
    Unknown,
    /// Any other status, lower-cased and trimmed.
    Other(String),
}

impl CanonicalStatus {
    /// Parses an operator's transition target.
    ///
    /// Unlike [`CanonicalStatus::canonicalize`] this is exact: only
    /// `approve`/`approved` and `reject`/`rejected` (any case) are accepted,
    /// so `"disapproved"` can never turn into an approval.
    #[must_use]
    pub fn transition_target(raw: &str) -> Option<Self> {
        let target = raw.trim();
        if target.eq_ignore_ascii_case("approved") || target.eq_ignore_ascii_case("approve") {
            Some(Self::Approved)
        } else if target.eq_ignore_ascii_case("rejected") || target.eq_ignore_ascii_case("reject")
        {
            Some(Self::Rejected)
        } else {
            None
        }
    }

    /// Maps a raw backend status onto the canonical vocabulary.
    ///
    /// The lower-cased, trimmed value is tested in priority order and the
    /// first match wins: `pend`, then `reject`, then `approv` / `complete`.
    #[must_use]
    pub fn canonicalize(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        if lowered.contains("pend") {
            Self::Pending
        } else if lowered.contains("reject") {
            Self::Rejected
        } else if lowered.contains("approv") || lowered.contains("complete") {
            Self::Approved
        } else if lowered.is_empty() {
            Self::Unknown
        } else {
            Self::Other(lowered)
        }
    }

    /// Returns the canonical wire string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
            Self::Other(s) => s,
        }
    }

    /// Returns `true` for the statuses a review ends in.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for CanonicalStatus {
    fn from(raw: &str) -> Self {
        Self::canonicalize(raw)
    }
}

impl Serialize for CanonicalStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CanonicalStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::canonicalize(&raw))
    }
}
