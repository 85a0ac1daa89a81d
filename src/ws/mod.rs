//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` pushes `status_changed` events to
//! consoles subscribed to the affected record kind, so they can refetch.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
