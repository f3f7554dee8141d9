//! Zoom webhook and readiness endpoints.
//!
//! - POST /zoom-webhook: URL validation challenges and RTMS start events
//! - GET /is-zoom-ready: reports the first missing credential

use crate::api::error::{ApiError, ApiResult};
use crate::api::AppState;
use crate::config::env;
use crate::zoom::{self, RtmsStarted, ZoomRtmsConnection, ZoomWebhook, RTMS_STARTED_EVENT};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tracing::{info, warn};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/zoom-webhook", post(zoom_webhook))
        .route("/is-zoom-ready", get(is_zoom_ready))
}

/// POST /zoom-webhook
///
/// Each event kind is handled on its own: a URL validation challenge is
/// answered immediately and nothing else runs for that request.
async fn zoom_webhook(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Response> {
    state
        .hub
        .broadcast("Received zoom webhook:", Some(body.clone()));

    let webhook: ZoomWebhook = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid webhook body: {e}")))?;
    info!("Received Zoom webhook event: {}", webhook.event);

    if let Some(plain_token) = webhook.plain_token() {
        let secret_token = state
            .config
            .zoom
            .secret_token()
            .ok_or_else(|| ApiError::internal(format!("{} is not set", env::ZOOM_SECRET_TOKEN)))?;
        let response = zoom::url_validation_response(secret_token, plain_token)
            .map_err(|e| ApiError::internal(e.to_string()))?;
        info!("Responding to URL validation challenge");
        return Ok(Json(response).into_response());
    }

    if webhook.event == RTMS_STARTED_EVENT {
        start_rtms_bot(&state, webhook.payload).await?;
    }

    Ok(StatusCode::OK.into_response())
}

/// Sends a bot to the RTMS stream using the recording options chosen on the
/// dashboard. The outcome of the Recall call is reported to the dashboard,
/// not to Zoom.
async fn start_rtms_bot(state: &AppState, payload: Value) -> ApiResult<()> {
    let started: RtmsStarted = serde_json::from_value(payload)
        .map_err(|e| ApiError::bad_request(format!("Invalid {RTMS_STARTED_EVENT} payload: {e}")))?;

    let zoom = &state.config.zoom;
    let (client_id, client_secret) = match (zoom.client_id(), zoom.client_secret()) {
        (Some(id), Some(secret)) => (id, secret),
        _ => {
            let message = format!(
                "Cannot sign RTMS stream: {} and {} must be set",
                env::ZOOM_CLIENT_ID,
                env::ZOOM_CLIENT_SECRET
            );
            state.hub.broadcast(&message, None);
            return Err(ApiError::internal(message));
        }
    };

    let connection = ZoomRtmsConnection::new(started, client_id, client_secret)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let recording_config = state.options.recording_config().await;

    let request = json!({
        "zoom_rtms": connection,
        "recording_config": recording_config,
    });

    if let Err(e) = state.bot.start_direct_connect(&request).await {
        warn!("Failed to start bot for RTMS stream: {}", e);
    }
    Ok(())
}

/// GET /is-zoom-ready
async fn is_zoom_ready(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    if state.config.recall.api_key().is_none() {
        state.hub.broadcast(
            &format!("Error: Please set {} in your .env file", env::RECALL_API_KEY),
            None,
        );
        return Err(ApiError::internal(format!(
            "No {} set",
            env::RECALL_API_KEY
        )));
    }

    let zoom = &state.config.zoom;
    let required = [
        (env::ZOOM_CLIENT_ID, zoom.client_id()),
        (env::ZOOM_CLIENT_SECRET, zoom.client_secret()),
        (env::ZOOM_SECRET_TOKEN, zoom.secret_token()),
    ];
    if let Some((name, _)) = required.iter().find(|(_, value)| value.is_none()) {
        return Err(ApiError::internal(format!(
            "Please set {name} in your .env to use Zoom RTMS"
        )));
    }

    Ok(Json(json!({
        "message": "Zoom RTMS is ready! Once your meeting starts, your webhook will be called and recording will start",
    })))
}

#[cfg(test)]
mod tests {
    use crate::api::routes::test_support::*;
    use crate::recall::RecallError;
    use crate::zoom;
    use axum::{body::Body, http::Request, http::StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_url_validation_challenge() {
        let bot = ok_bot();
        let mut app = TestApp::new(full_config(), bot.clone());

        let response = app
            .call(json_request(
                "POST",
                "/zoom-webhook",
                json!({
                    "event": "endpoint.url_validation",
                    "payload": { "plainToken": "challenge" }
                }),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["plainToken"], "challenge");
        assert_eq!(
            body["encryptedToken"],
            zoom::sign("secret-token", "challenge").unwrap()
        );
        assert!(bot.payloads().is_empty());
        assert_eq!(app.logs(), vec!["Received zoom webhook:"]);
    }

    #[tokio::test]
    async fn test_rtms_started_sends_bot_with_options() {
        let bot = ok_bot();
        let app = TestApp::new(full_config(), bot.clone());
        app.state.options.set_event("transcript.data", true).await;
        app.state
            .options
            .set_websocket_url("relay.example.com".to_string())
            .await;

        let response = app
            .call(json_request(
                "POST",
                "/zoom-webhook",
                json!({
                    "event": "meeting.rtms_started",
                    "payload": {
                        "meeting_uuid": "m-1",
                        "rtms_stream_id": "s-1",
                        "server_urls": "wss://rtms.zoom.us"
                    }
                }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let payloads = bot.payloads();
        assert_eq!(payloads.len(), 1);
        let sent = &payloads[0];
        assert_eq!(sent["zoom_rtms"]["meeting_uuid"], "m-1");
        assert_eq!(
            sent["zoom_rtms"]["signature"],
            zoom::rtms_signature("client-id", "client-secret", "m-1", "s-1").unwrap()
        );
        assert_eq!(
            sent["recording_config"]["realtime_endpoints"][0]["url"],
            "wss://relay.example.com/recall-events"
        );
    }

    #[tokio::test]
    async fn test_rtms_started_ignores_bot_failure() {
        let bot = StubBot::new(|| Err(RecallError::MissingApiKey));
        let app = TestApp::new(full_config(), bot.clone());

        let response = app
            .call(json_request(
                "POST",
                "/zoom-webhook",
                json!({
                    "event": "meeting.rtms_started",
                    "payload": { "meeting_uuid": "m", "rtms_stream_id": "s" }
                }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(bot.payloads().len(), 1);
    }

    #[tokio::test]
    async fn test_other_events_are_acknowledged() {
        let bot = ok_bot();
        let app = TestApp::new(full_config(), bot.clone());
        let response = app
            .call(json_request(
                "POST",
                "/zoom-webhook",
                json!({ "event": "meeting.started", "payload": {} }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(bot.payloads().is_empty());
    }

    #[tokio::test]
    async fn test_is_zoom_ready() {
        let app = TestApp::new(full_config(), ok_bot());
        let response = app
            .call(
                Request::builder()
                    .uri("/is-zoom-ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_is_zoom_ready_names_missing_secret() {
        let mut config = full_config();
        config.zoom.client_secret = None;
        let app = TestApp::new(config, ok_bot());

        let response = app
            .call(
                Request::builder()
                    .uri("/is-zoom-ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            "Please set ZOOM_CLIENT_SECRET in your .env to use Zoom RTMS"
        );
    }

    #[tokio::test]
    async fn test_is_zoom_ready_without_api_key_broadcasts() {
        let mut config = full_config();
        config.recall.api_key = None;
        let mut app = TestApp::new(config, ok_bot());

        let response = app
            .call(
                Request::builder()
                    .uri("/is-zoom-ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            app.logs(),
            vec!["Error: Please set RECALL_API_KEY in your .env file"]
        );
    }
}
