//! Record list, detail and stats DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{PaginationMeta, PaginationParams, default_page, default_per_page};
use crate::domain::filter::{ALL, BoundSide, parse_date_bound};
use crate::domain::{
    FilterState, Record, RecordKind, RecordStats, SearchField, SortDirection, SortField, SortSpec,
    StatsScope,
};
use crate::error::GatewayError;

/// Query string of `GET /records/{kind}` and `GET /records/{kind}/stats`.
///
/// Carries the whole filter state of the page; nothing is remembered
/// between requests.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Case-insensitive substring searched in the kind's searchable fields.
    #[serde(default)]
    pub search: Option<String>,
    /// Canonical status to keep (`all` disables the filter).
    #[serde(default)]
    pub status: Option<String>,
    /// Category / type / method to keep (`all` disables the filter).
    #[serde(default)]
    pub category: Option<String>,
    /// Inclusive lower bound (`YYYY-MM-DD` or RFC 3339).
    #[serde(default)]
    pub date_from: Option<String>,
    /// Inclusive upper bound (`YYYY-MM-DD` covers the whole day).
    #[serde(default)]
    pub date_to: Option<String>,
    /// Sort field. Defaults to `date`.
    #[serde(default)]
    pub sort: Option<SortField>,
    /// Sort direction. Defaults to `desc`.
    #[serde(default)]
    pub direction: Option<SortDirection>,
    /// Overrides the kind's default stats scope.
    #[serde(default)]
    pub stats_scope: Option<StatsScope>,
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            category: None,
            date_from: None,
            date_to: None,
            sort: None,
            direction: None,
            stats_scope: None,
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl ListQuery {
    /// Builds the [`FilterState`] this query describes.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for malformed date bounds.
    pub fn filter_state(&self) -> Result<FilterState, GatewayError> {
        Ok(FilterState {
            search: self.search.clone().unwrap_or_default(),
            status: enum_or_all(self.status.as_deref()),
            category: enum_or_all(self.category.as_deref()),
            date_from: parse_date_bound(self.date_from.as_deref(), BoundSide::Start)?,
            date_to: parse_date_bound(self.date_to.as_deref(), BoundSide::End)?,
            sort: SortSpec {
                field: self.sort.unwrap_or_default(),
                direction: self.direction.unwrap_or_default(),
            },
        })
    }

    /// Pagination part of the query.
    #[must_use]
    pub const fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

fn enum_or_all(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| ALL.to_string(), str::to_lowercase)
}

/// Response body for `GET /records/{kind}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordListResponse {
    /// Kind of the listed records.
    pub kind: RecordKind,
    /// One page of filtered, sorted records.
    pub data: Vec<Record>,
    /// Pagination over the filtered records.
    pub pagination: PaginationMeta,
    /// Summary stats.
    pub stats: RecordStats,
    /// Collection `stats` covers.
    pub stats_scope: StatsScope,
    /// Size of the unfiltered collection.
    pub collection_size: usize,
    /// Monotonic sequence number; discard responses older than the newest
    /// one rendered.
    pub sequence: u64,
    /// When the backend fetch completed.
    pub fetched_at: DateTime<Utc>,
}

/// Response body for `GET /records/{kind}/stats`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Kind the stats describe.
    pub kind: RecordKind,
    /// Stats over the whole collection.
    pub global: RecordStats,
    /// Stats over the records passing the filter.
    pub filtered: RecordStats,
    /// Monotonic sequence number.
    pub sequence: u64,
    /// When the backend fetch completed.
    pub fetched_at: DateTime<Utc>,
}

/// Catalog entry for `GET /config/record-kinds`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordKindInfo {
    /// Kind wire name.
    pub kind: RecordKind,
    /// Fields the search box matches.
    pub searchable_fields: Vec<SearchField>,
    /// Fields the table can be sorted by.
    pub sortable_fields: Vec<SortField>,
    /// Whether approve / reject is available.
    pub supports_transitions: bool,
    /// Default scope of the summary cards.
    pub default_stats_scope: StatsScope,
}

impl From<RecordKind> for RecordKindInfo {
    fn from(kind: RecordKind) -> Self {
        Self {
            kind,
            searchable_fields: kind.searchable_fields().to_vec(),
            sortable_fields: kind.sortable_fields().to_vec(),
            supports_transitions: kind.supports_transitions(),
            default_stats_scope: kind.default_stats_scope(),
        }
    }
}
