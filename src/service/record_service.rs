//! Record service: orchestrates backend calls, normalization and events.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use crate::backend::RecordBackend;
use crate::domain::filter::apply;
use crate::domain::normalize::{normalize_collection, normalize_record};
use crate::domain::{
    CanonicalStatus, EventBus, FilterState, Record, RecordEvent, RecordKind, RecordStats,
    StatsScope,
};
use crate::error::{BackendCall, GatewayError};

/// Filtered, sorted view of one collection fetch.
#[derive(Debug, Clone)]
pub struct RecordListing {
    /// Records passing the filter, in display order.
    pub records: Vec<Record>,
    /// Size of the whole normalized collection.
    pub collection_size: usize,
    /// Stats over the collection selected by `stats_scope`.
    pub stats: RecordStats,
    /// Scope `stats` was computed over.
    pub stats_scope: StatsScope,
    /// Monotonic request sequence number.
    pub sequence: u64,
    /// When the backend fetch completed.
    pub fetched_at: DateTime<Utc>,
}

/// Global and filtered stats from one collection fetch.
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    /// Stats over the whole collection.
    pub global: RecordStats,
    /// Stats over the records passing the filter.
    pub filtered: RecordStats,
    /// Monotonic request sequence number.
    pub sequence: u64,
    /// When the backend fetch completed.
    pub fetched_at: DateTime<Utc>,
}

/// Result of an acknowledged status transition.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// Kind of the transitioned record.
    pub kind: RecordKind,
    /// Record identifier.
    pub record_id: String,
    /// Status the backend acknowledged.
    pub status: CanonicalStatus,
    /// The record as re-fetched after acknowledgement. `None` when the
    /// re-fetch failed; the console should then refetch the list.
    pub record: Option<Record>,
}

/// Orchestration layer for all record operations.
///
/// Holds no record state: every read goes to the backend and every
/// transition is forwarded once, never retried. The only shared state is
/// the event bus and the response sequence counter.
#[derive(Debug, Clone)]
pub struct RecordService {
    backend: Arc<dyn RecordBackend>,
    event_bus: EventBus,
    sequence: Arc<AtomicU64>,
}

impl RecordService {
    /// Creates a new `RecordService`.
    #[must_use]
    pub fn new(backend: Arc<dyn RecordBackend>, event_bus: EventBus) -> Self {
        Self {
            backend,
            event_bus,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Hands out the next response sequence number. Taken when a request
    /// starts, so a later filter change always carries a larger number than
    /// an earlier one, whichever backend response resolves first.
    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed).saturating_add(1)
    }

    /// Fetches and normalizes the whole collection for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Backend`] if the backend fetch fails.
    pub async fn fetch_records(&self, kind: RecordKind) -> Result<Vec<Record>, GatewayError> {
        let items = self.backend.fetch_collection(kind).await.map_err(|e| {
            tracing::warn!(%kind, error = %e, "collection fetch failed");
            GatewayError::from_backend(e, kind, BackendCall::Collection)
        })?;
        Ok(normalize_collection(kind, &items))
    }

    /// Runs the full list pipeline for one page request.
    ///
    /// `stats_scope` overrides the kind's default scope.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for a sort field the kind
    /// does not expose and [`GatewayError::Backend`] if the fetch fails.
    pub async fn list_records(
        &self,
        kind: RecordKind,
        filter: &FilterState,
        stats_scope: Option<StatsScope>,
    ) -> Result<RecordListing, GatewayError> {
        filter.sort.validate_for(kind)?;
        let sequence = self.next_sequence();
        let collection = self.fetch_records(kind).await?;
        let fetched_at = Utc::now();

        let visible = apply(kind, &collection, filter);
        let stats_scope = stats_scope.unwrap_or_else(|| kind.default_stats_scope());
        let stats = match stats_scope {
            StatsScope::Global => RecordStats::compute(&collection),
            StatsScope::Filtered => RecordStats::compute(visible.iter().copied()),
        };
        let records: Vec<Record> = visible.into_iter().cloned().collect();

        tracing::debug!(
            %kind,
            sequence,
            total = collection.len(),
            visible = records.len(),
            "listed records"
        );

        Ok(RecordListing {
            records,
            collection_size: collection.len(),
            stats,
            stats_scope,
            sequence,
            fetched_at,
        })
    }

    /// Computes global and filtered stats for one page request.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Backend`] if the fetch fails.
    pub async fn stats(
        &self,
        kind: RecordKind,
        filter: &FilterState,
    ) -> Result<StatsSnapshot, GatewayError> {
        let sequence = self.next_sequence();
        let collection = self.fetch_records(kind).await?;
        let fetched_at = Utc::now();
        let filtered: Vec<&Record> = collection.iter().filter(|r| filter.matches(kind, r)).collect();
        Ok(StatsSnapshot {
            global: RecordStats::compute(&collection),
            filtered: RecordStats::compute(filtered),
            sequence,
            fetched_at,
        })
    }

    /// Fetches and normalizes a single record.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RecordNotFound`] if the backend does not
    /// know the id, [`GatewayError::InvalidRequest`] for a malformed id and
    /// [`GatewayError::Backend`] on fetch failures.
    pub async fn get_record(&self, kind: RecordKind, id: &str) -> Result<Record, GatewayError> {
        let id = validate_id(id)?;
        let raw = self
            .backend
            .fetch_record(kind, id)
            .await
            .map_err(|e| GatewayError::from_backend(e, kind, BackendCall::Record(id)))?
            .ok_or_else(|| GatewayError::RecordNotFound {
                kind,
                id: id.to_string(),
            })?;
        Ok(normalize_record(kind, &raw))
    }

    /// Asks the backend to move a pending record to a terminal status.
    ///
    /// `target` must name a terminal status exactly (`approve`/`approved`,
    /// `reject`/`rejected`, any case). On acknowledgement a `status_changed` event is
    /// published and the record is re-fetched. Failures are returned as-is
    /// and never retried.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::TransitionUnsupported`] for kinds that cannot be
    ///   reviewed.
    /// - [`GatewayError::InvalidRequest`] for a non-terminal target or a
    ///   malformed id.
    /// - [`GatewayError::TransitionRejected`] with the backend's message
    ///   when the backend refuses.
    /// - [`GatewayError::RecordNotFound`] / [`GatewayError::Backend`] for
    ///   unknown ids and transport failures.
    pub async fn transition(
        &self,
        kind: RecordKind,
        id: &str,
        target: &str,
        reason: Option<&str>,
    ) -> Result<TransitionOutcome, GatewayError> {
        if !kind.supports_transitions() {
            return Err(GatewayError::TransitionUnsupported(kind));
        }
        let id = validate_id(id)?;
        let Some(status) = CanonicalStatus::transition_target(target) else {
            return Err(GatewayError::InvalidRequest(format!(
                "target status must be approved or rejected, got {target:?}"
            )));
        };
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());

        if let Err(e) = self
            .backend
            .transition_status(kind, id, &status, reason)
            .await
        {
            tracing::warn!(%kind, record_id = id, %status, error = %e, "transition refused");
            return Err(GatewayError::from_backend(
                e,
                kind,
                BackendCall::Transition(id),
            ));
        }
        tracing::info!(%kind, record_id = id, %status, "transition acknowledged");

        let _ = self.event_bus.publish(RecordEvent::StatusChanged {
            kind,
            record_id: id.to_string(),
            status: status.clone(),
            reason: reason.map(str::to_string),
            timestamp: Utc::now(),
        });

        let record = match self.get_record(kind, id).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(%kind, record_id = id, error = %e, "re-fetch after transition failed");
                None
            }
        };

        Ok(TransitionOutcome {
            kind,
            record_id: id.to_string(),
            status,
            record,
        })
    }
}

/// Trims an id and rejects values that cannot be a single path segment.
fn validate_id(id: &str) -> Result<&str, GatewayError> {
    let id = id.trim();
    let invalid = id.is_empty()
        || id.contains(['/', '\\', '?', '#', '%'])
        || id.chars().any(char::is_whitespace)
        || id.chars().all(|c| c == '.');
    if invalid {
        return Err(GatewayError::InvalidRequest(format!("invalid record id: {id:?}")));
    }
    Ok(id)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, InMemoryBackend};
    use crate::domain::{SortField, SortSpec};
    use async_trait::async_trait;
    use serde_json::{Value, json};

    fn make_service() -> RecordService {
        let backend = InMemoryBackend::new()
            .with_records(
                RecordKind::Deposit,
                vec![
                    json!({"id": 1, "amount": "100.50", "status": "PENDING",
                        "createdAt": "2024-01-01", "email": "one@example.com"}),
                    json!({"id": 2, "amount": "bad", "status": "Completed",
                        "createdAt": "2024-02-01", "email": "two@example.com"}),
                ],
            )
            .with_records(
                RecordKind::NewsPost,
                vec![json!({"id": "n1", "title": "Maintenance", "status": "published"})],
            );
        RecordService::new(Arc::new(backend), EventBus::new(16))
    }

    /// Backend that fails every call.
    #[derive(Debug)]
    struct DownBackend;

    #[async_trait]
    impl RecordBackend for DownBackend {
        async fn fetch_collection(&self, _kind: RecordKind) -> Result<Vec<Value>, BackendError> {
            Err(BackendError::Transport("connection refused".to_string()))
        }

        async fn fetch_record(
            &self,
            _kind: RecordKind,
            _id: &str,
        ) -> Result<Option<Value>, BackendError> {
            Err(BackendError::Transport("connection refused".to_string()))
        }

        async fn transition_status(
            &self,
            _kind: RecordKind,
            _id: &str,
            _target: &CanonicalStatus,
            _reason: Option<&str>,
        ) -> Result<(), BackendError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn pending_filter_and_global_sum() {
        let service = make_service();
        let filter = FilterState {
            status: "pending".to_string(),
            ..FilterState::default()
        };
        let Ok(listing) = service.list_records(RecordKind::Deposit, &filter, None).await else {
            panic!("listing failed");
        };
        let ids: Vec<&str> = listing.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
        assert_eq!(listing.stats_scope, StatsScope::Global);
        assert_eq!(listing.stats.total_count, 2);
        assert!((listing.stats.total_amount - 100.5).abs() < f64::EPSILON);
        assert_eq!(listing.collection_size, 2);
    }

    #[tokio::test]
    async fn filtered_scope_override() {
        let service = make_service();
        let filter = FilterState {
            status: "approved".to_string(),
            ..FilterState::default()
        };
        let Ok(listing) = service
            .list_records(RecordKind::Deposit, &filter, Some(StatsScope::Filtered))
            .await
        else {
            panic!("listing failed");
        };
        assert_eq!(listing.stats.total_count, 1);
        assert_eq!(listing.stats.total_amount, 0.0);
    }

    #[tokio::test]
    async fn sequence_increases_per_request() {
        let service = make_service();
        let filter = FilterState::default();
        let Ok(first) = service.list_records(RecordKind::Deposit, &filter, None).await else {
            panic!("listing failed");
        };
        let Ok(second) = service.stats(RecordKind::Deposit, &filter).await else {
            panic!("stats failed");
        };
        assert!(second.sequence > first.sequence);
    }

    #[tokio::test]
    async fn unsupported_sort_field_is_rejected() {
        let service = make_service();
        let filter = FilterState {
            sort: SortSpec {
                field: SortField::Amount,
                ..SortSpec::default()
            },
            ..FilterState::default()
        };
        let result = service.list_records(RecordKind::NewsPost, &filter, None).await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn stats_reports_both_scopes() {
        let service = make_service();
        let filter = FilterState {
            search: "two@".to_string(),
            ..FilterState::default()
        };
        let Ok(snapshot) = service.stats(RecordKind::Deposit, &filter).await else {
            panic!("stats failed");
        };
        assert_eq!(snapshot.global.total_count, 2);
        assert_eq!(snapshot.filtered.total_count, 1);
        assert_eq!(snapshot.filtered.count_for("approved"), 1);
    }

    #[tokio::test]
    async fn fetch_failure_is_backend_error() {
        let service = RecordService::new(Arc::new(DownBackend), EventBus::new(4));
        let result = service
            .list_records(RecordKind::Deposit, &FilterState::default(), None)
            .await;
        assert!(matches!(result, Err(GatewayError::Backend(_))));
    }

    #[tokio::test]
    async fn get_record_normalizes() {
        let service = make_service();
        let Ok(record) = service.get_record(RecordKind::Deposit, " 1 ").await else {
            panic!("record should exist");
        };
        assert_eq!(record.status, CanonicalStatus::Pending);
        assert!((record.amount - 100.5).abs() < f64::EPSILON);

        let missing = service.get_record(RecordKind::Deposit, "404").await;
        assert!(matches!(missing, Err(GatewayError::RecordNotFound { .. })));

        let malformed = service.get_record(RecordKind::Deposit, "1/../2").await;
        assert!(matches!(malformed, Err(GatewayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn approve_publishes_and_refetches() {
        let service = make_service();
        let mut rx = service.event_bus().subscribe();

        let Ok(outcome) = service
            .transition(RecordKind::Deposit, "1", "APPROVE", None)
            .await
        else {
            panic!("transition failed");
        };
        assert_eq!(outcome.status, CanonicalStatus::Approved);
        let Some(record) = outcome.record else {
            panic!("record should be re-fetched");
        };
        assert_eq!(record.status, CanonicalStatus::Approved);

        let Ok(event) = rx.recv().await else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "status_changed");
        assert_eq!(event.kind(), RecordKind::Deposit);
    }

    #[tokio::test]
    async fn rejected_transition_surfaces_message_and_publishes_nothing() {
        let service = make_service();
        let rx = service.event_bus().subscribe();

        let result = service
            .transition(RecordKind::Deposit, "2", "rejected", Some("duplicate"))
            .await;
        let Err(GatewayError::TransitionRejected(message)) = result else {
            panic!("expected rejection");
        };
        assert_eq!(message, "deposit 2 is already approved");
        assert!(rx.is_empty());

        // Local state unchanged: the record is still approved.
        let Ok(record) = service.get_record(RecordKind::Deposit, "2").await else {
            panic!("record should exist");
        };
        assert_eq!(record.status, CanonicalStatus::Approved);
    }

    #[tokio::test]
    async fn transition_target_must_be_terminal() {
        let service = make_service();
        let result = service
            .transition(RecordKind::Deposit, "1", "pending", None)
            .await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn lookalike_targets_never_approve() {
        let service = make_service();
        for target in ["disapproved", "unapproved", "not approved", "completed"] {
            let result = service
                .transition(RecordKind::Deposit, "1", target, Some("fraud"))
                .await;
            assert!(
                matches!(result, Err(GatewayError::InvalidRequest(_))),
                "{target}"
            );
        }
        let Ok(record) = service.get_record(RecordKind::Deposit, "1").await else {
            panic!("record should exist");
        };
        assert_eq!(record.status, CanonicalStatus::Pending);
    }

    #[tokio::test]
    async fn dot_segment_ids_are_refused() {
        let service = make_service();
        for id in [".", "..", "...", "%2e%2e", "a\\b"] {
            let read = service.get_record(RecordKind::Deposit, id).await;
            assert!(matches!(read, Err(GatewayError::InvalidRequest(_))), "{id}");
            let write = service
                .transition(RecordKind::Deposit, id, "approved", None)
                .await;
            assert!(matches!(write, Err(GatewayError::InvalidRequest(_))), "{id}");
        }
    }

    #[tokio::test]
    async fn news_cannot_be_transitioned() {
        let service = make_service();
        let result = service
            .transition(RecordKind::NewsPost, "n1", "approved", None)
            .await;
        assert!(matches!(
            result,
            Err(GatewayError::TransitionUnsupported(RecordKind::NewsPost))
        ));
    }

    #[tokio::test]
    async fn refetch_failure_still_reports_success() {
        let service = RecordService::new(Arc::new(DownBackend), EventBus::new(4));
        let Ok(outcome) = service
            .transition(RecordKind::Withdrawal, "w1", "rejected", Some("  "))
            .await
        else {
            panic!("transition should be acknowledged");
        };
        assert_eq!(outcome.status, CanonicalStatus::Rejected);
        assert!(outcome.record.is_none());
    }
}
