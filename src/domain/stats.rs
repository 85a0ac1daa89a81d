//! Summary statistics derived from a record collection.
//!
//! Stats are never stored; callers recompute them from the collection they
//! hold on every request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Record;

/// Which collection a page's summary cards are computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatsScope {
    /// The whole normalized collection, regardless of filters.
    Global,
    /// Only the records passing the active filters.
    Filtered,
}

/// Count and amount sum for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct Bucket {
    /// Number of records in the group.
    pub count: usize,
    /// Sum of their amounts.
    pub amount: f64,
}

impl Bucket {
    fn add(&mut self, amount: f64) {
        self.count = self.count.saturating_add(1);
        self.amount += amount;
    }
}

/// Counts and sums over a record collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct RecordStats {
    /// Number of records.
    pub total_count: usize,
    /// Sum of every record's amount.
    pub total_amount: f64,
    /// Per canonical status.
    pub by_status: BTreeMap<String, Bucket>,
    /// Per category (type / method). Uncategorized records are grouped
    /// under `"uncategorized"`.
    pub by_category: BTreeMap<String, Bucket>,
}

impl RecordStats {
    /// Computes stats over `records`.
    pub fn compute<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut stats = Self::default();
        for record in records {
            stats.total_count = stats.total_count.saturating_add(1);
            stats.total_amount += record.amount;
            stats
                .by_status
                .entry(record.status.as_str().to_string())
                .or_default()
                .add(record.amount);
            let category = if record.category.is_empty() {
                "uncategorized"
            } else {
                record.category.as_str()
            };
            stats
                .by_category
                .entry(category.to_string())
                .or_default()
                .add(record.amount);
        }
        stats
    }

    /// Number of records with the given canonical status.
    #[must_use]
    pub fn count_for(&self, status: &str) -> usize {
        self.by_status.get(status).map_or(0, |b| b.count)
    }
}
