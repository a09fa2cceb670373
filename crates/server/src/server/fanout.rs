//! Broadcast fan-out to every open connection.

use axum::extract::ws::Utf8Bytes;
use protocol::packets::ServerMessage;
use tokio::sync::broadcast;
use tracing::warn;

/// A pre-encoded text frame. Clones share one buffer, so every connection in
/// a fan-out pass sends the same bytes.
pub type Frame = Utf8Bytes;

/// Pushes frames to every subscribed connection.
///
/// Delivery is best-effort: a connection that falls more than the channel
/// capacity behind skips the oldest frames, and nothing is retried.
#[derive(Debug, Clone)]
pub struct Fanout {
    tx: broadcast::Sender<Frame>,
}

impl Fanout {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a connection. Frames sent before this call are not seen.
    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.tx.subscribe()
    }

    /// Encode `message` once and push it to every subscriber. Returns the
    /// number of subscribers reached.
    pub fn send(&self, message: &ServerMessage) -> usize {
        let frame: Frame = match message.encode() {
            Ok(text) => text.into(),
            Err(e) => {
                warn!("Failed to encode {:?} frame: {}", message.message_type(), e);
                return 0;
            }
        };
        // An error only means nobody is connected.
        self.tx.send(frame).unwrap_or(0)
    }
}
