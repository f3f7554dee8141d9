//! HTTP and WebSocket server for the relay.
//!
//! Provides endpoints for:
//! - The dashboard (static files and the `/ui-updates` log feed)
//! - Zoom webhooks and readiness checks
//! - Sending a bot to a Google Meet meeting
//! - Recording options shared with the Zoom webhook
//! - The `/recall-events` socket the Recall.ai bot streams into

pub mod error;
pub mod routes;

use crate::config::Config;
use crate::hub::EventHub;
use crate::recall::BotProvider;
use crate::recording::RecordingOptionsHandle;
use anyhow::Result;
use axum::{handler::Handler, Router};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<EventHub>,
    pub options: RecordingOptionsHandle,
    pub bot: Arc<dyn BotProvider>,
    pub config: Arc<Config>,
}

/// Builds the full router. Requests that match no route are served from
/// `public_dir`, falling back to the 404 handler.
pub fn router(state: AppState, public_dir: &Path) -> Router {
    let not_found = routes::not_found.with_state(state.clone());
    let static_files = ServeDir::new(public_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found);

    Router::new()
        .merge(routes::ws::router())
        .merge(routes::zoom::router())
        .merge(routes::meet::router())
        .merge(routes::recording::router())
        .with_state(state)
        .fallback_service(static_files)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

pub struct ApiServer {
    host: String,
    port: u16,
    state: AppState,
}

impl ApiServer {
    pub fn new(state: AppState) -> Self {
        Self {
            host: state.config.server.host.clone(),
            port: state.config.server.port,
            state,
        }
    }

    pub async fn start(self) -> Result<()> {
        let app = router(self.state.clone(), &self.state.config.server.public_dir);

        let listener = tokio::net::TcpListener::bind((self.host.as_str(), self.port)).await?;

        info!("Endpoints:");
        info!("  GET  /                     - Dashboard");
        info!("  WS   /ui-updates           - Dashboard log feed");
        info!("  WS   /recall-events        - Recall.ai bot event stream");
        info!("  POST /zoom-webhook         - Zoom event notifications");
        info!("  GET  /is-zoom-ready        - Check Zoom RTMS credentials");
        info!("  POST /join-meet-meeting    - Send a bot to a Google Meet space");
        info!("  POST /set-recording-config - Enable/disable a recording event");
        info!("  POST /set-websocket-url    - Set the bot callback address");
        info!("  GET  /recording-config     - Show the current recording config");

        let started = format!(
            "HTTP server with UI WebSocket is running at http://localhost:{}",
            self.port
        );
        self.state.hub.broadcast(&started, None);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
