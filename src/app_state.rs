//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::RecordService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Record service: fetch, normalize, filter, transition.
    pub record_service: Arc<RecordService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Builds the state around a service, sharing its event bus.
    #[must_use]
    pub fn new(record_service: Arc<RecordService>) -> Self {
        let event_bus = record_service.event_bus().clone();
        Self {
            record_service,
            event_bus,
        }
    }
}
