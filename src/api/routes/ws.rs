//! WebSocket endpoints.
//!
//! - `/ui-updates`: dashboard clients, receive broadcasts only
//! - `/recall-events`: the Recall.ai bot; every text frame is dispatched to
//!   the hub. The bot connection is subscribed to broadcasts as well.

use crate::api::AppState;
use crate::hub::{ChannelSubscriber, EventHub, SubscriberId};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ui-updates", get(ui_updates))
        .route("/recall-events", get(recall_events))
}

/// GET /ui-updates
async fn ui_updates(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_ui_connection(socket, state.hub))
}

/// GET /recall-events
async fn recall_events(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_bot_connection(socket, state.hub))
}

type SplitReceiver = futures::stream::SplitStream<WebSocket>;

/// Registers the socket with the hub and spawns the task that writes
/// broadcasts to it.
fn attach(socket: WebSocket, hub: &EventHub) -> (SubscriberId, SplitReceiver, JoinHandle<()>) {
    let (mut sender, receiver) = socket.split();
    let (subscriber, mut outbound) = ChannelSubscriber::channel();
    let id = SubscriberId::new();
    hub.subscribe(id, Arc::new(subscriber));

    let send_task = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            if sender.send(Message::Text(message)).await.is_err() {
                break;
            }
        }
    });

    (id, receiver, send_task)
}

async fn handle_ui_connection(socket: WebSocket, hub: Arc<EventHub>) {
    let (id, mut receiver, send_task) = attach(socket, &hub);
    info!("UI WebSocket client connected");
    hub.broadcast("New UI client connected to server logs.", None);

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Close(_)) => break,
            Ok(_) => debug!("Ignoring message from UI client {}", id),
            Err(e) => {
                error!("UI WebSocket error: {}", e);
                break;
            }
        }
    }

    hub.unsubscribe(&id);
    send_task.abort();
    info!("UI WebSocket client disconnected");
}

async fn handle_bot_connection(socket: WebSocket, hub: Arc<EventHub>) {
    let (id, mut receiver, send_task) = attach(socket, &hub);
    hub.broadcast(
        "Recall Bot WebSocket client connected (Recall.ai bot has connected to this server).",
        None,
    );

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                hub.dispatch(&text);
            }
            Ok(Message::Binary(bytes)) => {
                hub.dispatch(&String::from_utf8_lossy(&bytes));
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                error!("Recall Bot WebSocket connection error: {}", e);
                hub.broadcast(
                    "Recall Bot WebSocket connection error:",
                    Some(json!({ "error": e.to_string() })),
                );
                break;
            }
        }
    }

    hub.unsubscribe(&id);
    send_task.abort();
    hub.broadcast(
        "Recall Bot WebSocket client disconnected (Recall.ai bot disconnected).",
        None,
    );
}
