//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{RecordEvent, RecordKind};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(socket: WebSocket, mut event_rx: broadcast::Receiver<RecordEvent>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs);
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(record_event) => {
                        if subs.matches(record_event.kind()) {
                            let msg = event_message(&record_event);
                            let json = serde_json::to_string(&msg).unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Wraps a domain event in an `event` envelope.
#[must_use]
pub fn event_message(event: &RecordEvent) -> WsMessage {
    WsMessage::new(
        uuid::Uuid::new_v4().to_string(),
        WsMessageType::Event,
        serde_json::to_value(event).unwrap_or_default(),
    )
}

/// Handles a text message from the client, returning an optional JSON response.
fn handle_text_message(text: &str, subs: &mut SubscriptionManager) -> Option<String> {
    let response = dispatch(text, subs);
    serde_json::to_string(&response).ok()
}

fn dispatch(text: &str, subs: &mut SubscriptionManager) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error("", 400, "malformed JSON");
    };
    if msg.msg_type != WsMessageType::Command {
        return WsMessage::error(msg.id, 400, "expected a command message");
    }
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { kinds } => match resolve_kinds(&kinds) {
            Ok((resolved, wildcard)) => {
                subs.subscribe(&resolved, wildcard);
                WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::json!({
                        "subscribed": resolved,
                        "kinds": subs.kinds(),
                        "wildcard": subs.is_subscribed_all(),
                    }),
                )
            }
            Err(message) => WsMessage::error(msg.id, 400, message),
        },
        WsCommand::Unsubscribe { kinds } => match resolve_kinds(&kinds) {
            Ok((resolved, wildcard)) => {
                subs.unsubscribe(&resolved, wildcard);
                WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::json!({
                        "unsubscribed": resolved,
                        "kinds": subs.kinds(),
                        "wildcard": subs.is_subscribed_all(),
                    }),
                )
            }
            Err(message) => WsMessage::error(msg.id, 400, message),
        },
    }
}

/// Parses kind names; `"*"` sets the wildcard flag. Any unknown name
/// rejects the whole command.
fn resolve_kinds(names: &[String]) -> Result<(Vec<RecordKind>, bool), String> {
    let mut kinds = Vec::new();
    let mut wildcard = false;
    let mut unknown = Vec::new();
    for name in names {
        if name.trim() == "*" {
            wildcard = true;
        } else if let Ok(kind) = name.parse::<RecordKind>() {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        } else {
            unknown.push(name.as_str());
        }
    }
    if unknown.is_empty() {
        Ok((kinds, wildcard))
    } else {
        Err(format!("unknown record kind(s): {}", unknown.join(", ")))
    }
}
