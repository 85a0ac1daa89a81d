//! Service layer: business logic orchestration.
//!
//! [`RecordService`] runs the fetch → normalize → filter/sort/derive
//! pipeline, forwards status transitions to the backend, and emits events
//! through the [`super::domain::EventBus`].

pub mod record_service;

pub use record_service::{RecordListing, RecordService, StatsSnapshot, TransitionOutcome};
