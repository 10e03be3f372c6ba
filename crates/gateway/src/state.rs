use std::{collections::HashMap, sync::Arc, time::Instant};

use {
    async_trait::async_trait,
    chefjunior_chat::{ConversationEngine, MessageSink},
    tokio::sync::{RwLock, mpsc},
    tracing::debug,
};

// ── Client channel ───────────────────────────────────────────────────────────

/// A live WebSocket connection for one `client_id`.
#[derive(Debug)]
pub struct ClientChannel {
    pub client_id: String,
    /// Unique per accepted socket; distinguishes a reconnect from the
    /// connection it replaced.
    pub conn_id: String,
    /// Queue feeding this connection's write loop.
    pub sender: mpsc::UnboundedSender<String>,
    pub connected_at: Instant,
}

impl ClientChannel {
    pub fn new(client_id: impl Into<String>, sender: mpsc::UnboundedSender<String>) -> Self {
        Self {
            client_id: client_id.into(),
            conn_id: uuid::Uuid::new_v4().to_string(),
            sender,
            connected_at: Instant::now(),
        }
    }

    /// Queue a text frame. Returns false once the write loop has gone away.
    pub fn send(&self, frame: &str) -> bool {
        self.sender.send(frame.to_string()).is_ok()
    }
}

// ── Connection registry ──────────────────────────────────────────────────────

/// Maps each `client_id` to at most one live channel.
///
/// Delivery is at-most-once: [`send_to`](Self::send_to) on an unknown id is
/// a silent no-op and nothing is buffered for clients that are offline.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    channels: RwLock<HashMap<String, ClientChannel>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `channel`, replacing any channel already registered for the
    /// same `client_id`. The replaced channel is returned as-is; it is not
    /// closed here.
    pub async fn register(&self, channel: ClientChannel) -> Option<ClientChannel> {
        let client_id = channel.client_id.clone();
        self.channels.write().await.insert(client_id, channel)
    }

    /// Remove the channel for `client_id`, if any.
    pub async fn deregister(&self, client_id: &str) -> Option<ClientChannel> {
        self.channels.write().await.remove(client_id)
    }

    /// Remove the channel for `client_id` only if it is still the one
    /// identified by `conn_id`.
    pub async fn deregister_if_current(
        &self,
        client_id: &str,
        conn_id: &str,
    ) -> Option<ClientChannel> {
        let mut channels = self.channels.write().await;
        match channels.get(client_id) {
            Some(current) if current.conn_id == conn_id => channels.remove(client_id),
            _ => None,
        }
    }

    /// Queue `message` on the client's channel. Returns whether a channel
    /// accepted it; callers are free to ignore the result.
    pub async fn send_to(&self, client_id: &str, message: &str) -> bool {
        match self.channels.read().await.get(client_id) {
            Some(channel) => channel.send(message),
            None => {
                debug!(client_id, "registry: dropping message for absent client");
                false
            },
        }
    }

    pub async fn is_connected(&self, client_id: &str) -> bool {
        self.channels.read().await.contains_key(client_id)
    }

    /// Number of registered clients.
    pub async fn client_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

#[async_trait]
impl MessageSink for ConnectionRegistry {
    async fn send_to(&self, client_id: &str, message: &str) -> bool {
        ConnectionRegistry::send_to(self, client_id, message).await
    }
}

// ── Gateway state ────────────────────────────────────────────────────────────

/// Shared gateway runtime state, wrapped in Arc for use across async tasks.
pub struct GatewayState {
    pub registry: Arc<ConnectionRegistry>,
    pub engine: Arc<ConversationEngine>,
    /// Server version string.
    pub version: String,
    /// Log every inbound WebSocket frame at info level.
    pub ws_request_logs: bool,
}

impl GatewayState {
    /// `engine` must deliver through `registry` for audio notices to reach
    /// WebSocket clients.
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        engine: Arc<ConversationEngine>,
        ws_request_logs: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry,
            engine,
            version: env!("CARGO_PKG_VERSION").to_string(),
            ws_request_logs,
        })
    }
}
