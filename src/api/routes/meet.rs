//! Google Meet bot endpoint (POST /join-meet-meeting).

use crate::api::error::{ApiError, ApiResult};
use crate::api::AppState;
use crate::config::env;
use crate::recall::RecallError;
use crate::recording::synthesize;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

/// Request body sent by the dashboard.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JoinMeetRequest {
    pub space_name: Option<String>,
    pub access_token: Option<String>,
    pub recording_option_list: Vec<String>,
    pub websocket_url: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/join-meet-meeting", post(join_meet_meeting))
}

/// Sends a Recall bot into a Google Meet space through the Meet Media API.
///
/// Upstream errors with a response are relayed with their original status
/// and body.
async fn join_meet_meeting(
    State(state): State<AppState>,
    Json(req): Json<JoinMeetRequest>,
) -> ApiResult<Response> {
    let reject = |status: StatusCode, message: &str| {
        state
            .hub
            .broadcast(&format!("Error in /join-meet-meeting: {message}"), None);
        ApiError::new(status, message)
    };

    let space_name = match req.space_name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => return Err(reject(StatusCode::BAD_REQUEST, "space_name is required")),
    };
    let access_token = match req.access_token.as_deref() {
        Some(token) if !token.is_empty() => token,
        _ => return Err(reject(StatusCode::BAD_REQUEST, "access_token is required")),
    };
    if state.config.recall.api_key().is_none() {
        return Err(reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{} is not set in environment variables", env::RECALL_API_KEY).as_str(),
        ));
    }

    let payload = json!({
        "google_meet_media_api": {
            "space_name": space_name,
            "access_token": access_token,
        },
        "recording_config": synthesize(&req.recording_option_list, &req.websocket_url),
    });

    match state.bot.start_direct_connect(&payload).await {
        Ok(response) if is_empty_body(&response.data) => {
            error!("No data returned from Recall.ai API");
            state.hub.broadcast("No data returned from Recall.ai API", None);
            Err(ApiError::internal("Failed to start meeting bot"))
        }
        Ok(response) => {
            let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
            Ok((status, Json(response.data)).into_response())
        }
        Err(RecallError::Upstream { status, body }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            Err(ApiError::relay(status, body))
        }
        Err(e) => {
            error!("Error calling Recall.ai API: {}", e);
            Err(ApiError::internal("Failed due to an internal server error."))
        }
    }
}

/// No data at all, or an empty text body.
fn is_empty_body(data: &Value) -> bool {
    data.is_null() || data.as_str() == Some("")
}
