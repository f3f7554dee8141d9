//! Zoom webhook payloads and HMAC signatures.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const URL_VALIDATION_EVENT: &str = "endpoint.url_validation";
pub const RTMS_STARTED_EVENT: &str = "meeting.rtms_started";

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("invalid HMAC key")]
    InvalidKey,
}

/// Top-level body of every Zoom webhook call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZoomWebhook {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub payload: Value,
}

impl ZoomWebhook {
    /// The challenge token of an `endpoint.url_validation` event.
    pub fn plain_token(&self) -> Option<&str> {
        if self.event != URL_VALIDATION_EVENT {
            return None;
        }
        self.payload.get("plainToken").and_then(Value::as_str)
    }
}

/// Payload of `meeting.rtms_started`.
#[derive(Debug, Clone, Deserialize)]
pub struct RtmsStarted {
    pub meeting_uuid: String,
    pub rtms_stream_id: String,
    #[serde(default)]
    pub server_urls: Value,
}

/// Response to Zoom's URL validation challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlValidationResponse {
    pub plain_token: String,
    pub encrypted_token: String,
}

/// The `zoom_rtms` section of a Recall direct-connect request.
#[derive(Debug, Clone, Serialize)]
pub struct ZoomRtmsConnection {
    pub meeting_uuid: String,
    pub rtms_stream_id: String,
    pub server_urls: Value,
    pub signature: String,
}

/// Hex-encoded HMAC-SHA256 of `message` under `secret`.
pub fn sign(secret: &str, message: &str) -> Result<String, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidKey)?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

pub fn url_validation_response(
    secret_token: &str,
    plain_token: &str,
) -> Result<UrlValidationResponse, SignatureError> {
    Ok(UrlValidationResponse {
        plain_token: plain_token.to_string(),
        encrypted_token: sign(secret_token, plain_token)?,
    })
}

/// Signature proving to Zoom's RTMS servers that this app may join the stream.
pub fn rtms_signature(
    client_id: &str,
    client_secret: &str,
    meeting_uuid: &str,
    stream_id: &str,
) -> Result<String, SignatureError> {
    sign(
        client_secret,
        &format!("{client_id},{meeting_uuid},{stream_id}"),
    )
}

impl ZoomRtmsConnection {
    pub fn new(
        started: RtmsStarted,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, SignatureError> {
        let signature = rtms_signature(
            client_id,
            client_secret,
            &started.meeting_uuid,
            &started.rtms_stream_id,
        )?;
        Ok(Self {
            meeting_uuid: started.meeting_uuid,
            rtms_stream_id: started.rtms_stream_id,
            server_urls: started.server_urls,
            signature,
        })
    }
}
