//! Real-time events streamed by the Recall.ai bot over `/recall-events`.
//!
//! Each frame is `{"event": <name>, "data": {...}}`. Known event names are
//! decoded into typed payloads; anything else is kept as raw JSON so new
//! event kinds flow through to the dashboard without code changes.

use crate::recording::events as names;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("invalid bot message: {0}")]
    InvalidMessage(#[source] serde_json::Error),
    #[error("malformed {event} payload: {source}")]
    MalformedPayload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Envelope shared by every bot message.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBotMessage {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordingRef {
    #[serde(default)]
    pub id: Value,
}

/// A meeting participant as reported by the bot.
///
/// Extra fields (`is_host`, `platform`, ...) are kept so the dashboard sees
/// everything the bot sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Participant {
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => display_id(&self.id),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MixedAudioChunk {
    pub buffer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MixedAudioData {
    pub recording: RecordingRef,
    pub data: MixedAudioChunk,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoFrame {
    pub participant: Participant,
    /// `webcam`, `screenshare`, ... kept as sent, `null` when absent.
    #[serde(rename = "type", default)]
    pub kind: Value,
    #[serde(default)]
    pub timestamp: Value,
    pub buffer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeparateVideoData {
    pub data: VideoFrame,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantAudio {
    pub participant: Participant,
    #[serde(default)]
    pub timestamp: Value,
    pub buffer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeparateAudioData {
    pub data: ParticipantAudio,
}

/// A classified bot event.
#[derive(Debug, Clone)]
pub enum BotEvent {
    MixedAudio(MixedAudioData),
    SeparateVideo(SeparateVideoData),
    SeparateAudio(SeparateAudioData),
    Transcript { partial: bool, data: Value },
    Other { event: String, data: Value },
}

/// Compact, dashboard-friendly description of one event.
///
/// Media summaries carry buffer lengths only, never the buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub label: String,
    pub data: Value,
}

impl BotEvent {
    /// Parses one text frame from the bot.
    pub fn parse(text: &str) -> Result<Self, EventError> {
        let raw: RawBotMessage = serde_json::from_str(text).map_err(EventError::InvalidMessage)?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawBotMessage) -> Result<Self, EventError> {
        let RawBotMessage { event, data } = raw;
        let malformed = |source| EventError::MalformedPayload {
            event: event.clone(),
            source,
        };

        let parsed = match event.as_str() {
            names::AUDIO_MIXED_RAW => serde_json::from_value(data)
                .map(Self::MixedAudio)
                .map_err(malformed)?,
            names::VIDEO_SEPARATE_PNG => serde_json::from_value(data)
                .map(Self::SeparateVideo)
                .map_err(malformed)?,
            names::AUDIO_SEPARATE_RAW => serde_json::from_value(data)
                .map(Self::SeparateAudio)
                .map_err(malformed)?,
            names::TRANSCRIPT => Self::Transcript {
                partial: false,
                data,
            },
            names::TRANSCRIPT_PARTIAL => Self::Transcript {
                partial: true,
                data,
            },
            _ => Self::Other {
                event: event.clone(),
                data,
            },
        };
        Ok(parsed)
    }

    /// The event name as it appears on the wire.
    pub fn name(&self) -> &str {
        match self {
            Self::MixedAudio(_) => names::AUDIO_MIXED_RAW,
            Self::SeparateVideo(_) => names::VIDEO_SEPARATE_PNG,
            Self::SeparateAudio(_) => names::AUDIO_SEPARATE_RAW,
            Self::Transcript { partial: false, .. } => names::TRANSCRIPT,
            Self::Transcript { partial: true, .. } => names::TRANSCRIPT_PARTIAL,
            Self::Other { event, .. } => event,
        }
    }

    pub fn summarize(&self) -> EventSummary {
        match self {
            Self::MixedAudio(audio) => EventSummary {
                label: format!(
                    "Received mixed audio ({}) for recording ID: {}",
                    self.name(),
                    display_id(&audio.recording.id)
                ),
                data: json!({
                    "recordingId": audio.recording.id,
                    "bufferSize": audio.data.buffer.len(),
                }),
            },
            Self::SeparateVideo(video) => {
                let frame = &video.data;
                EventSummary {
                    label: format!(
                        "Received separate participant video ({}) for: {} ({})",
                        self.name(),
                        frame.participant.display_name(),
                        display_id(&frame.kind)
                    ),
                    data: json!({
                        "participant": frame.participant,
                        "type": frame.kind,
                        "timestamp": frame.timestamp,
                        "bufferSize": frame.buffer.len(),
                    }),
                }
            }
            Self::SeparateAudio(audio) => {
                let chunk = &audio.data;
                EventSummary {
                    label: format!(
                        "Received separate participant audio ({}) for: {}",
                        self.name(),
                        chunk.participant.display_name()
                    ),
                    data: json!({
                        "participant": chunk.participant,
                        "timestamp": chunk.timestamp,
                        "bufferSize": chunk.buffer.len(),
                    }),
                }
            }
            Self::Transcript { data, .. } => EventSummary {
                label: format!("Received transcript event: {}", self.name()),
                data: data.clone(),
            },
            Self::Other { event, data } => EventSummary {
                label: format!("Unhandled Recall Bot WebSocket message event: {event}"),
                data: data.clone(),
            },
        }
    }
}

fn display_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
