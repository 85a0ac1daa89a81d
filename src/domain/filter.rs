//! Filter / sort engine over normalized records.
//!
//! Pure and synchronous: for a fixed collection and [`FilterState`] the
//! output is always the same. Records with missing or malformed fields are
//! simply non-matches for the affected filter dimension.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::normalize::parse_timestamp_str;
use super::{Record, RecordKind};
use crate::error::GatewayError;

/// Sentinel filter value that disables an enum filter.
pub const ALL: &str = "all";

/// Field a list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Primary timestamp.
    #[default]
    Date,
    /// Monetary amount.
    Amount,
    /// Canonical status string.
    Status,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest / oldest first.
    Asc,
    /// Largest / newest first.
    #[default]
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Single-field, single-direction ordering. Defaults to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct SortSpec {
    /// Field to order by.
    pub field: SortField,
    /// Direction.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Checks that `kind`'s page exposes this sort field.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for a field the kind does
    /// not sort by.
    pub fn validate_for(&self, kind: RecordKind) -> Result<(), GatewayError> {
        if kind.sortable_fields().contains(&self.field) {
            Ok(())
        } else {
            Err(GatewayError::InvalidRequest(format!(
                "{kind} records cannot be sorted by {:?}",
                self.field
            )))
        }
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self.field {
            // Undated records trail in both directions.
            SortField::Date => match (a.created_at, b.created_at) {
                (Some(x), Some(y)) => self.direction.apply(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortField::Amount => self.direction.apply(a.amount.total_cmp(&b.amount)),
            SortField::Status => self
                .direction
                .apply(a.status.as_str().cmp(b.status.as_str())),
        }
    }
}

/// The user's current search / status / date selections for a list page.
///
/// A request always carries the complete state; nothing is merged with a
/// previous request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    /// Free-text search; empty matches everything.
    pub search: String,
    /// Canonical status to keep, or [`ALL`].
    pub status: String,
    /// Category (type / method) to keep, or [`ALL`].
    pub category: String,
    /// Inclusive lower bound on `created_at`.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub date_to: Option<DateTime<Utc>>,
    /// Ordering of the visible subset.
    pub sort: SortSpec,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: ALL.to_string(),
            category: ALL.to_string(),
            date_from: None,
            date_to: None,
            sort: SortSpec::default(),
        }
    }
}

impl FilterState {
    /// Returns `true` if `record` passes every filter dimension.
    #[must_use]
    pub fn matches(&self, kind: RecordKind, record: &Record) -> bool {
        self.matches_search(kind, record)
            && enum_matches(&self.status, record.status.as_str())
            && enum_matches(&self.category, &record.category)
            && self.matches_dates(record)
    }

    fn matches_search(&self, kind: RecordKind, record: &Record) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        kind.searchable_fields()
            .iter()
            .any(|field| record.search_value(*field).to_lowercase().contains(&needle))
    }

    fn matches_dates(&self, record: &Record) -> bool {
        if self.date_from.is_none() && self.date_to.is_none() {
            return true;
        }
        let Some(ts) = record.created_at else {
            return false;
        };
        self.date_from.is_none_or(|from| ts >= from) && self.date_to.is_none_or(|to| ts <= to)
    }
}

fn enum_matches(filter: &str, value: &str) -> bool {
    let filter = filter.trim();
    filter.is_empty() || filter.eq_ignore_ascii_case(ALL) || filter.eq_ignore_ascii_case(value)
}

/// Which end of a date range a bound closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    /// `date_from`: a bare date means the start of that day.
    Start,
    /// `date_to`: a bare date means the last instant of that day.
    End,
}

/// Parses a date-range bound given either as `YYYY-MM-DD` or as a full
/// timestamp. Empty input means "unbounded".
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if the value is neither.
pub fn parse_date_bound(
    raw: Option<&str>,
    side: BoundSide,
) -> Result<Option<DateTime<Utc>>, GatewayError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let naive = match side {
            BoundSide::Start => date.and_hms_opt(0, 0, 0),
            BoundSide::End => date.and_hms_nano_opt(23, 59, 59, 999_999_999),
        };
        return Ok(naive.map(|n| Utc.from_utc_datetime(&n)));
    }
    parse_timestamp_str(raw)
        .map(Some)
        .ok_or_else(|| GatewayError::InvalidRequest(format!("invalid date bound: {raw}")))
}

/// Narrows `records` to the entries matching `filter`, in collection order.
#[must_use]
pub fn filter_records<'a>(
    kind: RecordKind,
    records: &'a [Record],
    filter: &FilterState,
) -> Vec<&'a Record> {
    records.iter().filter(|r| filter.matches(kind, r)).collect()
}

/// Orders `records` in place. Stable: ties keep their relative order.
pub fn sort_records(records: &mut [&Record], sort: SortSpec) {
    records.sort_by(|a, b| sort.compare(a, b));
}

/// Filters then sorts: the visible subset of a list page.
#[must_use]
pub fn apply<'a>(kind: RecordKind, records: &'a [Record], filter: &FilterState) -> Vec<&'a Record> {
    let mut visible = filter_records(kind, records, filter);
    sort_records(&mut visible, filter.sort);
    visible
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::normalize::normalize_record;
    use serde_json::json;

    fn record(raw: serde_json::Value) -> Record {
        normalize_record(RecordKind::Deposit, &raw)
    }

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    fn sample() -> Vec<Record> {
        vec![
            record(json!({"id": "1", "amount": "100.50", "status": "PENDING",
                "createdAt": "2024-01-01", "email": "alice@example.com", "method": "card"})),
            record(json!({"id": "2", "amount": "bad", "status": "Completed",
                "createdAt": "2024-03-01", "email": "bob@example.com", "method": "crypto"})),
            record(json!({"id": "3", "amount": 20, "status": "rejected",
                "createdAt": "2024-02-01", "email": "carol@example.com", "method": "card",
                "txId": "0xFEED"})),
        ]
    }

    #[test]
    fn status_all_returns_everything_in_order() {
        let records = sample();
        let filter = FilterState::default();
        let visible = filter_records(RecordKind::Deposit, &records, &filter);
        assert_eq!(ids(&visible), vec!["1", "2", "3"]);
    }

    #[test]
    fn default_sort_is_newest_first() {
        let records = vec![
            record(json!({"id": "jan", "date": "2024-01-01"})),
            record(json!({"id": "mar", "date": "2024-03-01"})),
            record(json!({"id": "feb", "date": "2024-02-01"})),
        ];
        let visible = apply(RecordKind::Deposit, &records, &FilterState::default());
        assert_eq!(ids(&visible), vec!["mar", "feb", "jan"]);
    }

    #[test]
    fn status_filter_is_exact_on_canonical_value() {
        let records = sample();
        let filter = FilterState {
            status: "pending".to_string(),
            ..FilterState::default()
        };
        let visible = filter_records(RecordKind::Deposit, &records, &filter);
        assert_eq!(ids(&visible), vec!["1"]);

        let filter = FilterState {
            status: "approv".to_string(),
            ..FilterState::default()
        };
        assert!(filter_records(RecordKind::Deposit, &records, &filter).is_empty());
    }

    #[test]
    fn category_filter() {
        let records = sample();
        let filter = FilterState {
            category: "CARD".to_string(),
            ..FilterState::default()
        };
        let visible = filter_records(RecordKind::Deposit, &records, &filter);
        assert_eq!(ids(&visible), vec!["1", "3"]);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let records = sample();
        let filter = FilterState {
            search: "BOB@EXAMPLE".to_string(),
            ..FilterState::default()
        };
        let visible = filter_records(RecordKind::Deposit, &records, &filter);
        assert_eq!(ids(&visible), vec!["2"]);

        let filter = FilterState {
            search: "feed".to_string(),
            ..FilterState::default()
        };
        let visible = filter_records(RecordKind::Deposit, &records, &filter);
        assert_eq!(ids(&visible), vec!["3"]);
    }

    #[test]
    fn blank_search_passes_everything() {
        let records = sample();
        let filter = FilterState {
            search: "   ".to_string(),
            ..FilterState::default()
        };
        assert_eq!(filter_records(RecordKind::Deposit, &records, &filter).len(), 3);
    }

    #[test]
    fn search_only_looks_at_the_kinds_fields() {
        let post = normalize_record(
            RecordKind::NewsPost,
            &json!({"id": "n1", "title": "Quarterly results", "email": "press@example.com"}),
        );
        let records = vec![post];
        let by_title = FilterState {
            search: "quarterly".to_string(),
            ..FilterState::default()
        };
        assert_eq!(filter_records(RecordKind::NewsPost, &records, &by_title).len(), 1);
        let by_email = FilterState {
            search: "press@".to_string(),
            ..FilterState::default()
        };
        assert!(filter_records(RecordKind::NewsPost, &records, &by_email).is_empty());
    }

    #[test]
    fn date_range_is_inclusive() {
        let records = sample();
        let Ok(from) = parse_date_bound(Some("2024-02-01"), BoundSide::Start) else {
            panic!("valid bound");
        };
        let Ok(to) = parse_date_bound(Some("2024-03-01"), BoundSide::End) else {
            panic!("valid bound");
        };
        let filter = FilterState {
            date_from: from,
            date_to: to,
            ..FilterState::default()
        };
        let visible = filter_records(RecordKind::Deposit, &records, &filter);
        assert_eq!(ids(&visible), vec!["2", "3"]);
    }

    #[test]
    fn open_ended_ranges() {
        let records = sample();
        let Ok(to) = parse_date_bound(Some("2024-01-31"), BoundSide::End) else {
            panic!("valid bound");
        };
        let filter = FilterState {
            date_to: to,
            ..FilterState::default()
        };
        assert_eq!(ids(&filter_records(RecordKind::Deposit, &records, &filter)), vec!["1"]);
    }

    #[test]
    fn undated_records_fail_date_filters_only() {
        let records = vec![record(json!({"id": "x"}))];
        assert_eq!(
            filter_records(RecordKind::Deposit, &records, &FilterState::default()).len(),
            1
        );
        let Ok(from) = parse_date_bound(Some("2000-01-01"), BoundSide::Start) else {
            panic!("valid bound");
        };
        let filter = FilterState {
            date_from: from,
            ..FilterState::default()
        };
        assert!(filter_records(RecordKind::Deposit, &records, &filter).is_empty());
    }

    #[test]
    fn date_bound_parsing() {
        assert!(matches!(parse_date_bound(None, BoundSide::Start), Ok(None)));
        assert!(matches!(parse_date_bound(Some(" "), BoundSide::End), Ok(None)));
        assert!(parse_date_bound(Some("2024-02-30"), BoundSide::Start).is_err());
        assert!(parse_date_bound(Some("last week"), BoundSide::Start).is_err());
        let Ok(Some(end)) = parse_date_bound(Some("2024-02-01"), BoundSide::End) else {
            panic!("valid bound");
        };
        assert_eq!(end.to_rfc3339(), "2024-02-01T23:59:59.999999999+00:00");
        let Ok(Some(exact)) = parse_date_bound(Some("2024-02-01T10:00:00Z"), BoundSide::End)
        else {
            panic!("valid bound");
        };
        assert_eq!(exact.to_rfc3339(), "2024-02-01T10:00:00+00:00");
    }

    #[test]
    fn amount_sort_is_stable() {
        let records = vec![
            record(json!({"id": "a", "amount": 5})),
            record(json!({"id": "b", "amount": 10})),
            record(json!({"id": "c", "amount": 5})),
            record(json!({"id": "d", "amount": 1})),
        ];
        let filter = FilterState {
            sort: SortSpec {
                field: SortField::Amount,
                direction: SortDirection::Asc,
            },
            ..FilterState::default()
        };
        let visible = apply(RecordKind::Deposit, &records, &filter);
        assert_eq!(ids(&visible), vec!["d", "a", "c", "b"]);

        let filter = FilterState {
            sort: SortSpec {
                field: SortField::Amount,
                direction: SortDirection::Desc,
            },
            ..FilterState::default()
        };
        let visible = apply(RecordKind::Deposit, &records, &filter);
        assert_eq!(ids(&visible), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn undated_records_trail_in_both_directions() {
        let records = vec![
            record(json!({"id": "none"})),
            record(json!({"id": "old", "date": "2020-01-01"})),
            record(json!({"id": "new", "date": "2024-01-01"})),
        ];
        let mut filter = FilterState::default();
        assert_eq!(
            ids(&apply(RecordKind::Deposit, &records, &filter)),
            vec!["new", "old", "none"]
        );
        filter.sort.direction = SortDirection::Asc;
        assert_eq!(
            ids(&apply(RecordKind::Deposit, &records, &filter)),
            vec!["old", "new", "none"]
        );
    }

    #[test]
    fn status_sort() {
        let records = sample();
        let filter = FilterState {
            sort: SortSpec {
                field: SortField::Status,
                direction: SortDirection::Asc,
            },
            ..FilterState::default()
        };
        let visible = apply(RecordKind::Deposit, &records, &filter);
        assert_eq!(ids(&visible), vec!["2", "1", "3"]);
    }

    #[test]
    fn apply_is_deterministic() {
        let records = sample();
        let filter = FilterState {
            search: "example".to_string(),
            ..FilterState::default()
        };
        let first = ids(&apply(RecordKind::Deposit, &records, &filter));
        let second = ids(&apply(RecordKind::Deposit, &records, &filter));
        assert_eq!(first, second);
    }

    #[test]
    fn sort_field_must_be_exposed_by_the_kind() {
        let by_amount = SortSpec {
            field: SortField::Amount,
            direction: SortDirection::Desc,
        };
        assert!(by_amount.validate_for(RecordKind::Deposit).is_ok());
        assert!(by_amount.validate_for(RecordKind::NewsPost).is_err());
        assert!(SortSpec::default().validate_for(RecordKind::NewsPost).is_ok());
    }
}
