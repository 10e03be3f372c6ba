//! Conversation engine for the cooking assistant.
//!
//! Owns per-client conversation history, turns each inbound utterance (typed
//! or transcribed) into a chat completion call, and hands replies to a
//! [`MessageSink`] for delivery.

pub mod engine;
pub mod fallback;
pub mod locks;
pub mod runtime;
pub mod store;

pub use {
    engine::{AudioOutcome, AudioUpload, ConversationEngine},
    fallback::{CompletionFailure, ReplyOutcome, fallback_reply},
    runtime::{MessageSink, NullSink},
    store::{HistoryStore, InMemoryHistoryStore},
};
