//! Channel-backed subscriber used for WebSocket connections.

use super::Subscriber;
use tokio::sync::mpsc;

/// Forwards broadcasts into an unbounded queue drained by the connection's
/// writer task. Once the writer stops, the subscriber reports not ready.
#[derive(Clone)]
pub struct ChannelSubscriber {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelSubscriber {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Subscriber for ChannelSubscriber {
    fn is_ready(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send(&self, message: &str) -> bool {
        self.tx.send(message.to_string()).is_ok()
    }
}
