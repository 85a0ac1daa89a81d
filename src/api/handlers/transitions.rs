//! Review handlers: approve, reject, generic transition.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{ApproveRequest, RejectRequest, TransitionRequest, TransitionResponse};
use crate::api::extract::{ApiJson, OptionalJson};
use crate::app_state::AppState;
use crate::domain::RecordKind;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /records/{kind}/{id}/approve` — Approve a pending record. The
/// body is optional.
///
/// # Errors
///
/// Returns [`GatewayError`] if the kind cannot be reviewed or the backend
/// refuses the transition.
#[utoipa::path(
    post,
    path = "/api/v1/records/{kind}/{id}/approve",
    tag = "Review",
    summary = "Approve a record",
    params(
        ("kind" = String, Path, description = "Record kind"),
        ("id" = String, Path, description = "Record identifier"),
    ),
    request_body(
        content = ApproveRequest,
        description = "Optional; an empty body approves without a note",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Transition acknowledged", body = TransitionResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "Record not found", body = ErrorResponse),
        (status = 409, description = "Backend refused the transition", body = ErrorResponse),
        (status = 422, description = "Kind cannot be reviewed", body = ErrorResponse),
    )
)]
pub async fn approve(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    OptionalJson(req): OptionalJson<ApproveRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let kind: RecordKind = kind.parse()?;
    let outcome = state
        .record_service
        .transition(kind, &id, "approved", req.reason.as_deref())
        .await?;
    Ok(Json(TransitionResponse::from(outcome)))
}

/// `POST /records/{kind}/{id}/reject` — Reject a pending record.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a blank reason, and the
/// same errors as [`approve`] otherwise.
#[utoipa::path(
    post,
    path = "/api/v1/records/{kind}/{id}/reject",
    tag = "Review",
    summary = "Reject a record",
    params(
        ("kind" = String, Path, description = "Record kind"),
        ("id" = String, Path, description = "Record identifier"),
    ),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Transition acknowledged", body = TransitionResponse),
        (status = 400, description = "Missing rejection reason", body = ErrorResponse),
        (status = 404, description = "Record not found", body = ErrorResponse),
        (status = 409, description = "Backend refused the transition", body = ErrorResponse),
        (status = 422, description = "Kind cannot be reviewed", body = ErrorResponse),
    )
)]
pub async fn reject(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    ApiJson(req): ApiJson<RejectRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let kind: RecordKind = kind.parse()?;
    if req.reason.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "a rejection reason is required".to_string(),
        ));
    }
    let outcome = state
        .record_service
        .transition(kind, &id, "rejected", Some(&req.reason))
        .await?;
    Ok(Json(TransitionResponse::from(outcome)))
}

/// `POST /records/{kind}/{id}/transition` — Move a record to a terminal
/// status named exactly (review dialog).
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] unless the target is exactly
/// `approve(d)` or `reject(ed)`, and the same errors as [`approve`]
/// otherwise.
#[utoipa::path(
    post,
    path = "/api/v1/records/{kind}/{id}/transition",
    tag = "Review",
    summary = "Transition a record",
    description = "Forwards a status transition to the backend once. Failures are never retried; the backend's message is returned verbatim.",
    params(
        ("kind" = String, Path, description = "Record kind"),
        ("id" = String, Path, description = "Record identifier"),
    ),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Transition acknowledged", body = TransitionResponse),
        (status = 400, description = "Target is not approve(d) / reject(ed), or malformed body", body = ErrorResponse),
        (status = 404, description = "Record not found", body = ErrorResponse),
        (status = 409, description = "Backend refused the transition", body = ErrorResponse),
        (status = 422, description = "Kind cannot be reviewed", body = ErrorResponse),
    )
)]
pub async fn transition(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    ApiJson(req): ApiJson<TransitionRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let kind: RecordKind = kind.parse()?;
    let outcome = state
        .record_service
        .transition(kind, &id, &req.status, req.reason.as_deref())
        .await?;
    Ok(Json(TransitionResponse::from(outcome)))
}

/// Review routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/records/{kind}/{id}/approve", post(approve))
        .route("/records/{kind}/{id}/reject", post(reject))
        .route("/records/{kind}/{id}/transition", post(transition))
}
