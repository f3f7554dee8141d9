//! Recording configuration synthesis for the Recall.ai bot API.
//!
//! Turns a list of requested real-time event names plus a callback address
//! into the `recording_config` object Recall expects. Both the Zoom webhook
//! and the Google Meet join endpoint build their bot request through
//! [`synthesize`], so identical input always yields identical output.

pub mod options;

pub use options::{RecordingOptions, RecordingOptionsHandle};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Real-time event names a caller can request from the bot.
pub mod events {
    pub const AUDIO_MIXED_RAW: &str = "audio_mixed_raw.data";
    pub const VIDEO_SEPARATE_PNG: &str = "video_separate_png.data";
    pub const AUDIO_SEPARATE_RAW: &str = "audio_separate_raw.data";
    pub const TRANSCRIPT: &str = "transcript.data";
    pub const TRANSCRIPT_PARTIAL: &str = "transcript.partial_data";
}

/// Path the bot connects back to on this server.
pub const RECALL_EVENTS_PATH: &str = "recall-events";

const VIDEO_MIXED_LAYOUT: &str = "gallery_view_v2";

/// Serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyConfig {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptProvider {
    pub meeting_captions: EmptyConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptConfig {
    pub provider: TranscriptProvider,
}

/// A destination the bot streams real-time events to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtimeEndpoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub events: Vec<String>,
}

/// The `recording_config` section of a Recall bot request.
///
/// Absent sections are omitted from the JSON rather than sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_mixed_raw: Option<EmptyConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<TranscriptConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_mixed_layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_separate_png: Option<EmptyConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_separate_raw: Option<EmptyConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime_endpoints: Option<Vec<RealtimeEndpoint>>,
}

impl RecordingConfig {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Builds the recording configuration for the requested events.
///
/// Unknown event names don't enable any section but are still forwarded in
/// the endpoint's `events` list. An empty `websocket_url` means no realtime
/// endpoint is requested.
pub fn synthesize<S: AsRef<str>>(requested: &[S], websocket_url: &str) -> RecordingConfig {
    let has = |name: &str| requested.iter().any(|e| e.as_ref() == name);
    let mut config = RecordingConfig::default();

    if has(events::AUDIO_MIXED_RAW) {
        config.audio_mixed_raw = Some(EmptyConfig::default());
    }
    if has(events::TRANSCRIPT) || has(events::TRANSCRIPT_PARTIAL) {
        config.transcript = Some(TranscriptConfig::default());
    }
    if has(events::VIDEO_SEPARATE_PNG) {
        config.video_mixed_layout = Some(VIDEO_MIXED_LAYOUT.to_string());
        config.video_separate_png = Some(EmptyConfig::default());
    }
    if has(events::AUDIO_SEPARATE_RAW) {
        config.audio_separate_raw = Some(EmptyConfig::default());
    }

    if let Some(url) = realtime_url(websocket_url) {
        config.realtime_endpoints = Some(vec![RealtimeEndpoint {
            kind: "websocket".to_string(),
            url,
            events: requested.iter().map(|e| e.as_ref().to_string()).collect(),
        }]);
    }

    debug!("Recording config generated: {:?}", config);
    config
}

/// Normalizes a callback address into the `wss://.../recall-events` URL the
/// bot should connect to. Returns `None` for an empty address.
pub fn realtime_url(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }

    let path = if raw.ends_with('/') {
        RECALL_EVENTS_PATH.to_string()
    } else {
        format!("/{RECALL_EVENTS_PATH}")
    };

    let base = if let Some(rest) = raw.strip_prefix("http://") {
        format!("wss://{rest}")
    } else if let Some(rest) = raw.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if raw.starts_with("wss://") || raw.starts_with("ws://") {
        raw.to_string()
    } else {
        format!("wss://{raw}")
    };

    Some(base + &path)
}
