//! Trait abstracting the delivery side the engine needs.
//!
//! This decouples `chefjunior-chat` from the gateway's connection registry so
//! the engine can be compiled and tested without a WebSocket stack.

use async_trait::async_trait;

/// Fire-and-forget delivery of a text frame to a named client.
///
/// Delivery is at-most-once: when no channel is registered for `client_id`
/// the message is dropped and `false` is returned. Implementations must not
/// buffer for absent clients or surface an error to the caller.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send_to(&self, client_id: &str, message: &str) -> bool;
}

/// Sink that drops everything; used when the engine runs without a gateway
/// (one-shot CLI exchanges).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl MessageSink for NullSink {
    async fn send_to(&self, _client_id: &str, _message: &str) -> bool {
        false
    }
}
