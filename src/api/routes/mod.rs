//! API route modules.

pub mod meet;
pub mod recording;
pub mod ws;
pub mod zoom;

use crate::api::AppState;
use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
};
use tracing::error;

/// Fallback for anything that is neither a route nor a static file.
pub async fn not_found(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> (StatusCode, &'static str) {
    let response = (
        StatusCode::NOT_FOUND,
        "Sorry, the page you requested could not be found.",
    );
    if uri.path().ends_with("favicon.ico") {
        return response;
    }

    error!("404 Not Found: {} {}", method, uri);
    if method == Method::POST {
        state.hub.broadcast(
            "Received 404 POST error, this may mean that your Zoom \"Event notification endpoint URL\" is configured for a different path! This sample expects /zoom-webhook",
            None,
        );
    }
    response
}
