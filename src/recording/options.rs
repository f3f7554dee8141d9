//! Recording options selected from the dashboard, shared with the Zoom webhook.

use super::{synthesize, RecordingConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Event names and callback address used when a Zoom RTMS stream starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingOptions {
    /// Requested event names, in the order they were enabled.
    pub events: Vec<String>,
    pub websocket_url: String,
}

impl RecordingOptions {
    pub fn recording_config(&self) -> RecordingConfig {
        synthesize(&self.events, &self.websocket_url)
    }
}

/// Thread-safe handle for sharing recording options between API handlers.
#[derive(Clone, Default)]
pub struct RecordingOptionsHandle {
    inner: Arc<Mutex<RecordingOptions>>,
}

impl RecordingOptionsHandle {
    pub async fn get(&self) -> RecordingOptions {
        self.inner.lock().await.clone()
    }

    /// Enables or disables an event. Returns the updated event list.
    pub async fn set_event(&self, event: &str, enabled: bool) -> Vec<String> {
        let mut options = self.inner.lock().await;
        if enabled {
            if !options.events.iter().any(|e| e == event) {
                options.events.push(event.to_string());
            }
        } else {
            options.events.retain(|e| e != event);
        }
        options.events.clone()
    }

    pub async fn set_websocket_url(&self, url: String) {
        self.inner.lock().await.websocket_url = url;
    }

    pub async fn recording_config(&self) -> RecordingConfig {
        self.inner.lock().await.recording_config()
    }
}
