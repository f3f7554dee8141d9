//! Event hub fanning bot events and server log lines out to WebSocket clients.
//!
//! The hub owns the set of connected subscribers. Every broadcast is sent to
//! a snapshot of that set taken when the broadcast starts, and subscribers
//! that are no longer writable are skipped without being removed; removal
//! only happens when a connection reports its own close.

pub mod subscriber;

pub use subscriber::ChannelSubscriber;

use crate::events::BotEvent;
use chrono::{SecondsFormat, Utc};
use dashmap::DashMap;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

const RECEIVED_PREVIEW_CHARS: usize = 100;

/// A downstream connection that can receive broadcast messages.
pub trait Subscriber: Send + Sync {
    /// Whether the connection can currently accept a message.
    fn is_ready(&self) -> bool;

    /// Queues a message without waiting for delivery. Returns `false` if the
    /// connection went away.
    fn send(&self, message: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Message pushed to dashboard clients.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastMessage {
    pub log: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub timestamp: String,
}

impl BroadcastMessage {
    pub fn new(log: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            log: log.into(),
            data,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

pub struct EventHub {
    subscribers: DashMap<SubscriberId, Arc<dyn Subscriber>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
        }
    }

    /// Adds a subscriber. Returns `false` if the id was already registered,
    /// in which case the existing subscriber is kept.
    pub fn subscribe(&self, id: SubscriberId, subscriber: Arc<dyn Subscriber>) -> bool {
        let mut inserted = false;
        self.subscribers.entry(id).or_insert_with(|| {
            inserted = true;
            subscriber
        });
        if inserted {
            debug!("Subscriber {} registered", id);
        }
        inserted
    }

    /// Removes a subscriber. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: &SubscriberId) -> bool {
        let removed = self.subscribers.remove(id).is_some();
        if removed {
            debug!("Subscriber {} unregistered", id);
        }
        removed
    }

    pub fn contains(&self, id: &SubscriberId) -> bool {
        self.subscribers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Sends a log line (and optional structured data) to every ready
    /// subscriber. Returns how many subscribers it was handed to.
    pub fn broadcast(&self, log: &str, data: Option<Value>) -> usize {
        match &data {
            Some(data) => info!("[UI Broadcast] {} {}", log, data),
            None => info!("[UI Broadcast] {}", log),
        }

        let message = match serde_json::to_string(&BroadcastMessage::new(log, data)) {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to serialize broadcast message: {}", e);
                return 0;
            }
        };

        self.snapshot()
            .iter()
            .filter(|subscriber| subscriber.is_ready())
            .filter(|subscriber| subscriber.send(&message))
            .count()
    }

    /// Classifies one raw frame from the bot and broadcasts its summary.
    ///
    /// Never fails: frames that can't be decoded are reported to the
    /// dashboard as a diagnostic instead.
    pub fn dispatch(&self, raw: &str) -> usize {
        match BotEvent::parse(raw) {
            Ok(event) => self.dispatch_event(&event),
            Err(e) => {
                warn!(
                    "Failed to process Recall bot message: {} ({})",
                    e,
                    preview(raw, 200)
                );
                self.broadcast(
                    "Error parsing message from Recall Bot WebSocket or processing data:",
                    Some(json!({
                        "error": e.to_string(),
                        "receivedMessage": preview(raw, RECEIVED_PREVIEW_CHARS),
                    })),
                )
            }
        }
    }

    pub fn dispatch_event(&self, event: &BotEvent) -> usize {
        let summary = event.summarize();
        self.broadcast(&summary.label, Some(summary.data))
    }

    fn snapshot(&self) -> Vec<Arc<dyn Subscriber>> {
        self.subscribers
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

fn preview(raw: &str, max_chars: usize) -> String {
    let truncated: String = raw.chars().take(max_chars).collect();
    format!("{truncated}...")
}
