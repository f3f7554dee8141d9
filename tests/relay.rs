//! End-to-end tests for the WebSocket relay.
//!
//! Runs the real router on an ephemeral port, connects a dashboard client to
//! /ui-updates and a fake bot to /recall-events, and checks what the
//! dashboard sees.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use meeting_relay::api::{router, AppState};
use meeting_relay::config::Config;
use meeting_relay::hub::EventHub;
use meeting_relay::recall::{BotProvider, BotResponse, RecallError};
use meeting_relay::recording::RecordingOptionsHandle;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct NoBot;

#[async_trait]
impl BotProvider for NoBot {
    async fn start_direct_connect(&self, _payload: &Value) -> Result<BotResponse, RecallError> {
        Err(RecallError::MissingApiKey)
    }
}

async fn spawn_server() -> (SocketAddr, Arc<EventHub>, tempfile::TempDir) {
    let public = tempfile::tempdir().unwrap();
    let hub = Arc::new(EventHub::new());
    let state = AppState {
        hub: hub.clone(),
        options: RecordingOptionsHandle::default(),
        bot: Arc::new(NoBot),
        config: Arc::new(Config::default()),
    };
    let app = router(state, public.path());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, hub, public)
}

async fn connect(addr: SocketAddr, path: &str) -> Client {
    let (socket, _) = connect_async(format!("ws://{addr}{path}")).await.unwrap();
    socket
}

/// Reads broadcasts until one whose log starts with `prefix` arrives.
async fn next_log(client: &mut Client, prefix: &str) -> Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let message = client.next().await.unwrap().unwrap();
            let Ok(text) = message.to_text() else {
                continue;
            };
            let Ok(value) = serde_json::from_str::<Value>(text) else {
                continue;
            };
            if value["log"].as_str().is_some_and(|log| log.starts_with(prefix)) {
                return value;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("no broadcast starting with {prefix:?}"))
}

async fn wait_for_subscribers(hub: &EventHub, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while hub.len() != count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_bot_events_reach_dashboard() {
    let (addr, hub, _public) = spawn_server().await;

    let mut ui = connect(addr, "/ui-updates").await;
    next_log(&mut ui, "New UI client connected").await;

    let mut bot = connect(addr, "/recall-events").await;
    next_log(&mut ui, "Recall Bot WebSocket client connected").await;

    bot.send(Message::text(
        r#"{"event":"video_separate_png.data","data":{"data":{"participant":{"id":3,"name":"Grace"},"type":"screenshare","timestamp":{"relative":4.2},"buffer":"AAAAAAAA"}}}"#,
    ))
    .await
    .unwrap();

    let summary = next_log(&mut ui, "Received separate participant video").await;
    assert_eq!(summary["data"]["bufferSize"], 8);
    assert_eq!(summary["data"]["participant"]["name"], "Grace");
    assert!(summary["timestamp"].is_string());

    bot.send(Message::text("garbage")).await.unwrap();
    let diagnostic = next_log(&mut ui, "Error parsing message").await;
    assert_eq!(diagnostic["data"]["receivedMessage"], "garbage...");

    bot.send(Message::text(r#"{"event":"transcript.data","data":{"words":[]}}"#))
        .await
        .unwrap();
    next_log(&mut ui, "Received transcript event: transcript.data").await;

    bot.close(None).await.unwrap();
    next_log(&mut ui, "Recall Bot WebSocket client disconnected").await;
    wait_for_subscribers(&hub, 1).await;
}

#[tokio::test]
async fn test_closed_dashboard_is_unsubscribed() {
    let (addr, hub, _public) = spawn_server().await;

    let mut first = connect(addr, "/ui-updates").await;
    next_log(&mut first, "New UI client connected").await;
    let mut second = connect(addr, "/ui-updates").await;
    next_log(&mut second, "New UI client connected").await;
    assert_eq!(hub.len(), 2);

    first.close(None).await.unwrap();
    wait_for_subscribers(&hub, 1).await;

    hub.broadcast("still here", None);
    next_log(&mut second, "still here").await;
}
