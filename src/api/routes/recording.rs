//! Recording option endpoints.
//!
//! Provides HTTP endpoints for:
//! - Enabling/disabling a recording event (POST /set-recording-config)
//! - Setting the bot callback address (POST /set-websocket-url)
//! - Showing the resulting recording config (GET /recording-config)

use crate::api::AppState;
use crate::recording::RecordingConfig;
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SetRecordingConfigRequest {
    pub checkbox_id: String,
    #[serde(default)]
    pub checkbox_on: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetWebsocketUrlRequest {
    #[serde(default)]
    pub websocket_url: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/set-recording-config", post(set_recording_config))
        .route("/set-websocket-url", post(set_websocket_url))
        .route("/recording-config", get(recording_config))
}

async fn set_recording_config(
    State(state): State<AppState>,
    Json(req): Json<SetRecordingConfigRequest>,
) -> Json<Value> {
    let events = state
        .options
        .set_event(&req.checkbox_id, req.checkbox_on)
        .await;

    let action = if req.checkbox_on { "Added" } else { "Removed" };
    info!("{} recording config: {}", action, req.checkbox_id);
    state
        .hub
        .broadcast(&format!("{action}:"), Some(json!(req.checkbox_id)));
    state.hub.broadcast(
        "Updated Zoom RTMS recording config:",
        Some(json!(events)),
    );

    Json(json!({ "events": events }))
}

async fn set_websocket_url(
    State(state): State<AppState>,
    Json(req): Json<SetWebsocketUrlRequest>,
) -> Json<Value> {
    state.hub.broadcast(
        "Updated Zoom RTMS websocket url:",
        Some(json!(req.websocket_url)),
    );
    state
        .options
        .set_websocket_url(req.websocket_url.clone())
        .await;

    Json(json!({ "websocket_url": req.websocket_url }))
}

async fn recording_config(State(state): State<AppState>) -> Json<RecordingConfig> {
    Json(state.options.recording_config().await)
}
