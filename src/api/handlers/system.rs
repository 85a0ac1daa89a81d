//! System endpoints: health check, record kind catalog.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::RecordKindInfo;
use crate::app_state::AppState;
use crate::domain::RecordKind;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp. Does not call the backend.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /config/record-kinds` — List supported record kinds.
#[utoipa::path(
    get,
    path = "/config/record-kinds",
    tag = "System",
    summary = "List record kinds",
    description = "Returns the searchable and sortable fields, review support and default stats scope of every record kind.",
    responses(
        (status = 200, description = "Record kind catalog", body = Vec<RecordKindInfo>),
    )
)]
pub async fn record_kinds_handler() -> impl IntoResponse {
    let kinds: Vec<RecordKindInfo> = RecordKind::ALL
        .iter()
        .copied()
        .map(RecordKindInfo::from)
        .collect();
    (StatusCode::OK, Json(kinds))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/record-kinds", get(record_kinds_handler))
}
