//! Client for the Recall.ai meeting direct connect API.

use crate::hub::EventHub;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

const DIRECT_CONNECT_PATH: &str = "/api/v1/meeting_direct_connect";

/// Successful response from the bot provider.
#[derive(Debug, Clone, PartialEq)]
pub struct BotResponse {
    pub status: u16,
    pub data: Value,
}

#[derive(Debug, Error)]
pub enum RecallError {
    #[error("RECALL_API_KEY is not set")]
    MissingApiKey,
    #[error("request to Recall.ai failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Recall.ai responded with status {status}: {body}")]
    Upstream { status: u16, body: Value },
}

impl RecallError {
    /// JSON describing the failure, suitable for the dashboard.
    pub fn details(&self) -> Value {
        match self {
            Self::Upstream { body, .. } => body.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

/// Starts meeting bots. Implemented by [`RecallClient`]; handlers depend on
/// the trait so they can run against a stub.
#[async_trait]
pub trait BotProvider: Send + Sync {
    async fn start_direct_connect(&self, payload: &Value) -> Result<BotResponse, RecallError>;
}

pub struct RecallClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    hub: Arc<EventHub>,
}

impl RecallClient {
    pub fn new(api_key: Option<String>, base_url: String, hub: Arc<EventHub>) -> Self {
        info!("Initialized Recall.ai client with base URL: {}", base_url);

        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
            hub,
        }
    }

    async fn post(&self, payload: &Value) -> Result<BotResponse, RecallError> {
        let api_key = self.api_key.as_deref().ok_or(RecallError::MissingApiKey)?;
        let url = format!("{}{}", self.base_url, DIRECT_CONNECT_PATH);

        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {api_key}"))
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        let data = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if !(200..300).contains(&status) {
            return Err(RecallError::Upstream { status, body: data });
        }

        Ok(BotResponse { status, data })
    }
}

#[async_trait]
impl BotProvider for RecallClient {
    async fn start_direct_connect(&self, payload: &Value) -> Result<BotResponse, RecallError> {
        self.hub.broadcast(
            "Sending request to Recall.ai API (/v1/direct_meeting_connect) with payload:",
            Some(Value::String(payload.to_string())),
        );

        match self.post(payload).await {
            Ok(response) => {
                self.hub.broadcast(
                    "Successfully called Recall.ai API. Response:",
                    Some(response.data.clone()),
                );
                Ok(response)
            }
            Err(e) => {
                error!("Error calling Recall.ai API: {}", e);
                self.hub
                    .broadcast("Error calling Recall.ai API:", Some(e.details()));
                Err(e)
            }
        }
    }
}
