//! In-memory [`RecordBackend`] serving a seeded fixture.
//!
//! Used for local demos (`BACKEND_FIXTURE_PATH`) and tests. It behaves
//! like the platform where it matters to the console: ids are matched
//! after normalization, and only pending records may be transitioned.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{BackendError, RecordBackend};
use crate::domain::normalize::{CanonicalField, collection_items, lookup, text_of};
use crate::domain::{CanonicalStatus, RecordKind};

/// Fixture-backed record store.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    collections: RwLock<HashMap<RecordKind, Vec<Value>>>,
}

impl InMemoryBackend {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds (replaces) the raw collection for `kind`.
    #[must_use]
    pub fn with_records(mut self, kind: RecordKind, records: Vec<Value>) -> Self {
        self.collections.get_mut().insert(kind, records);
        self
    }

    /// Builds a store from a fixture object keyed by kind
    /// (`{"deposits": [...], "news": {"data": [...]}}`).
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Decode`] if the fixture is not an object or
    /// names an unknown kind.
    pub fn from_fixture(fixture: Value) -> Result<Self, BackendError> {
        let Value::Object(map) = fixture else {
            return Err(BackendError::Decode(
                "fixture must be an object keyed by record kind".to_string(),
            ));
        };
        let mut collections = HashMap::new();
        for (key, payload) in map {
            let kind: RecordKind = key
                .parse()
                .map_err(|_| BackendError::Decode(format!("unknown record kind in fixture: {key}")))?;
            collections.insert(kind, collection_items(payload));
        }
        Ok(Self {
            collections: RwLock::new(collections),
        })
    }

    /// Reads a JSON fixture file.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] if the file cannot be read and
    /// [`BackendError::Decode`] if it is not a valid fixture.
    pub async fn from_fixture_file(path: &Path) -> Result<Self, BackendError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BackendError::Transport(format!("{}: {e}", path.display())))?;
        let fixture: Value =
            serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))?;
        Self::from_fixture(fixture)
    }

    /// Appends a raw record to `kind`'s collection.
    pub async fn insert(&self, kind: RecordKind, record: Value) {
        self.collections
            .write()
            .await
            .entry(kind)
            .or_default()
            .push(record);
    }

    /// Number of raw records stored for `kind`.
    pub async fn len(&self, kind: RecordKind) -> usize {
        self.collections.read().await.get(&kind).map_or(0, Vec::len)
    }
}

fn record_id(raw: &Value) -> String {
    text_of(lookup(raw, CanonicalField::Id))
}

#[async_trait]
impl RecordBackend for InMemoryBackend {
    async fn fetch_collection(&self, kind: RecordKind) -> Result<Vec<Value>, BackendError> {
        Ok(self
            .collections
            .read()
            .await
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_record(
        &self,
        kind: RecordKind,
        id: &str,
    ) -> Result<Option<Value>, BackendError> {
        let map = self.collections.read().await;
        Ok(map
            .get(&kind)
            .and_then(|records| records.iter().find(|r| record_id(r) == id))
            .cloned())
    }

    async fn transition_status(
        &self,
        kind: RecordKind,
        id: &str,
        target: &CanonicalStatus,
        reason: Option<&str>,
    ) -> Result<(), BackendError> {
        let mut map = self.collections.write().await;
        let record = map
            .get_mut(&kind)
            .and_then(|records| records.iter_mut().find(|r| record_id(r) == id))
            .ok_or(BackendError::NotFound)?;

        let current = CanonicalStatus::canonicalize(&text_of(lookup(record, CanonicalField::Status)));
        if current != CanonicalStatus::Pending {
            return Err(BackendError::Rejected {
                status: 409,
                message: format!("{kind} {id} is already {current}"),
            });
        }

        let Some(fields) = record.as_object_mut() else {
            return Err(BackendError::Decode(format!("{kind} {id} is not an object")));
        };
        fields.insert("status".to_string(), Value::String(target.as_str().to_string()));
        if let Some(reason) = reason {
            fields.insert("reason".to_string(), Value::String(reason.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> InMemoryBackend {
        InMemoryBackend::new().with_records(
            RecordKind::Deposit,
            vec![
                json!({"id": 1, "amount": "100.50", "status": "PENDING"}),
                json!({"id": 2, "amount": "bad", "status": "Completed"}),
            ],
        )
    }

    #[tokio::test]
    async fn fetches_seeded_collection() {
        let backend = seeded();
        let Ok(items) = backend.fetch_collection(RecordKind::Deposit).await else {
            panic!("fetch failed");
        };
        assert_eq!(items.len(), 2);
        let Ok(empty) = backend.fetch_collection(RecordKind::NewsPost).await else {
            panic!("fetch failed");
        };
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn fetch_record_matches_numeric_ids_as_text() {
        let backend = seeded();
        let Ok(Some(record)) = backend.fetch_record(RecordKind::Deposit, "2").await else {
            panic!("record 2 should exist");
        };
        assert_eq!(record["amount"], "bad");
        assert!(matches!(
            backend.fetch_record(RecordKind::Deposit, "9").await,
            Ok(None)
        ));
    }

    #[tokio::test]
    async fn transition_moves_pending_record() {
        let backend = seeded();
        let result = backend
            .transition_status(
                RecordKind::Deposit,
                "1",
                &CanonicalStatus::Rejected,
                Some("proof unreadable"),
            )
            .await;
        assert!(result.is_ok());
        let Ok(Some(record)) = backend.fetch_record(RecordKind::Deposit, "1").await else {
            panic!("record 1 should exist");
        };
        assert_eq!(record["status"], "rejected");
        assert_eq!(record["reason"], "proof unreadable");
    }

    #[tokio::test]
    async fn terminal_records_cannot_transition() {
        let backend = seeded();
        let result = backend
            .transition_status(RecordKind::Deposit, "2", &CanonicalStatus::Approved, None)
            .await;
        let Err(BackendError::Rejected { status, message }) = result else {
            panic!("expected rejection");
        };
        assert_eq!(status, 409);
        assert_eq!(message, "deposit 2 is already approved");
    }

    #[tokio::test]
    async fn unknown_record_is_not_found() {
        let backend = seeded();
        let result = backend
            .transition_status(RecordKind::Deposit, "77", &CanonicalStatus::Approved, None)
            .await;
        assert_eq!(result, Err(BackendError::NotFound));
    }

    #[tokio::test]
    async fn fixture_loading() {
        let fixture = json!({
            "deposits": [{"id": 1}],
            "news": {"data": [{"id": "n1"}, {"id": "n2"}]}
        });
        let Ok(backend) = InMemoryBackend::from_fixture(fixture) else {
            panic!("valid fixture");
        };
        assert_eq!(backend.len(RecordKind::Deposit).await, 1);
        assert_eq!(backend.len(RecordKind::NewsPost).await, 2);

        assert!(InMemoryBackend::from_fixture(json!({"clients": []})).is_err());
        assert!(InMemoryBackend::from_fixture(json!([])).is_err());
    }

    #[tokio::test]
    async fn insert_appends() {
        let backend = InMemoryBackend::new();
        backend.insert(RecordKind::Referral, json!({"id": "r1"})).await;
        assert_eq!(backend.len(RecordKind::Referral).await, 1);
    }
}
