//! Chat completion collaborator: typed conversation turns and the providers
//! that turn a turn sequence into an assistant reply.

pub mod error;
pub mod model;
pub mod providers;

pub use {
    error::{Error, Result},
    model::{ChatMessage, CompletionOptions, CompletionResponse, LlmProvider, Role, Usage},
};
