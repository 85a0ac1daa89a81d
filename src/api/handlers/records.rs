//! Record read handlers: list, stats, detail.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ListQuery, RecordListResponse, StatsResponse};
use crate::api::extract::ApiQuery;
use crate::app_state::AppState;
use crate::domain::{Record, RecordKind};
use crate::error::{ErrorResponse, GatewayError};

/// `GET /records/{kind}` — Filtered, sorted, paginated list.
///
/// # Errors
///
/// Returns [`GatewayError`] on an unknown kind, invalid or unparsable
/// filter values, or a failed backend fetch.
#[utoipa::path(
    get,
    path = "/api/v1/records/{kind}",
    tag = "Records",
    summary = "List records",
    description = "Fetches the kind's collection from the backend, normalizes it, applies the filter state from the query string and returns one page plus summary stats.",
    params(
        ("kind" = String, Path, description = "Record kind (e.g. `deposit`, `withdrawals`, `news`)"),
        ListQuery,
    ),
    responses(
        (status = 200, description = "One page of records", body = RecordListResponse),
        (status = 400, description = "Unknown kind or invalid filter", body = ErrorResponse),
        (status = 502, description = "Backend fetch failed", body = ErrorResponse),
    )
)]
pub async fn list_records(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let kind: RecordKind = kind.parse()?;
    let filter = query.filter_state()?;

    let listing = state
        .record_service
        .list_records(kind, &filter, query.stats_scope)
        .await?;

    let (data, pagination) = query.pagination().paginate(listing.records);

    Ok(Json(RecordListResponse {
        kind,
        data,
        pagination,
        stats: listing.stats,
        stats_scope: listing.stats_scope,
        collection_size: listing.collection_size,
        sequence: listing.sequence,
        fetched_at: listing.fetched_at,
    }))
}

/// `GET /records/{kind}/stats` — Global and filtered summary stats.
///
/// # Errors
///
/// Returns [`GatewayError`] on an unknown kind, invalid or unparsable
/// filter values, or a failed backend fetch.
#[utoipa::path(
    get,
    path = "/api/v1/records/{kind}/stats",
    tag = "Records",
    summary = "Record stats",
    description = "Counts and amount sums per status and category, over the whole collection and over the filtered subset.",
    params(
        ("kind" = String, Path, description = "Record kind"),
        ListQuery,
    ),
    responses(
        (status = 200, description = "Stats", body = StatsResponse),
        (status = 400, description = "Unknown kind or invalid filter", body = ErrorResponse),
        (status = 502, description = "Backend fetch failed", body = ErrorResponse),
    )
)]
pub async fn record_stats(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let kind: RecordKind = kind.parse()?;
    let filter = query.filter_state()?;
    let snapshot = state.record_service.stats(kind, &filter).await?;

    Ok(Json(StatsResponse {
        kind,
        global: snapshot.global,
        filtered: snapshot.filtered,
        sequence: snapshot.sequence,
        fetched_at: snapshot.fetched_at,
    }))
}

/// `GET /records/{kind}/{id}` — One normalized record.
///
/// # Errors
///
/// Returns [`GatewayError::RecordNotFound`] if the backend does not know
/// the record.
#[utoipa::path(
    get,
    path = "/api/v1/records/{kind}/{id}",
    tag = "Records",
    summary = "Get record",
    params(
        ("kind" = String, Path, description = "Record kind"),
        ("id" = String, Path, description = "Record identifier"),
    ),
    responses(
        (status = 200, description = "Normalized record", body = Record),
        (status = 404, description = "Record not found", body = ErrorResponse),
        (status = 502, description = "Backend fetch failed", body = ErrorResponse),
    )
)]
pub async fn get_record(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let kind: RecordKind = kind.parse()?;
    let record = state.record_service.get_record(kind, &id).await?;
    Ok(Json(record))
}

/// Record read routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/records/{kind}", get(list_records))
        .route("/records/{kind}/stats", get(record_stats))
        .route("/records/{kind}/{id}", get(get_record))
}
