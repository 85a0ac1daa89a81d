//! REST endpoint handlers organized by resource.

pub mod records;
pub mod system;
pub mod transitions;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(records::routes())
        .merge(transitions::routes())
}
