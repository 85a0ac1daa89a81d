//! Per-connection subscription manager.
//!
//! Tracks which record kinds a WebSocket client is subscribed to and
//! provides server-side event filtering.

use std::collections::BTreeSet;

use crate::domain::RecordKind;

/// Manages the set of kind subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed kinds. If `subscribe_all` is true, this set is ignored.
    kinds: BTreeSet<RecordKind>,
    /// Whether the client subscribes to all kinds (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds kinds to the subscription set, optionally enabling the wildcard.
    pub fn subscribe(&mut self, kinds: &[RecordKind], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.kinds.extend(kinds.iter().copied());
    }

    /// Removes kinds from the subscription set. A wildcard unsubscribe
    /// clears everything.
    pub fn unsubscribe(&mut self, kinds: &[RecordKind], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
            self.kinds.clear();
            return;
        }
        for kind in kinds {
            self.kinds.remove(kind);
        }
    }

    /// Returns `true` if events of `kind` should be forwarded.
    #[must_use]
    pub fn matches(&self, kind: RecordKind) -> bool {
        self.subscribe_all || self.kinds.contains(&kind)
    }

    /// Explicitly subscribed kinds, in wire-name order.
    #[must_use]
    pub fn kinds(&self) -> Vec<RecordKind> {
        self.kinds.iter().copied().collect()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
