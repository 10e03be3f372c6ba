//! Mapping collaborator failures to user-facing text.
//!
//! Failure details are logged by the engine and never shown to the client;
//! the client only ever sees the configured fallback text.

use {chefjunior_agents::Error as ProviderError, chefjunior_config::AssistantConfig};

/// Why a chat completion produced no assistant turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionFailure {
    /// No API key configured.
    NotConfigured,
    /// Connection, TLS, or timeout failure.
    Transport,
    /// The API answered with an error status (auth, quota, bad request).
    Rejected { status: u16 },
    /// The response could not be decoded.
    Malformed,
    /// The response carried no assistant text.
    EmptyReply,
    /// The history backend failed before the request could be built.
    HistoryUnavailable,
}

impl From<&ProviderError> for CompletionFailure {
    fn from(err: &ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured { .. } => Self::NotConfigured,
            ProviderError::Transport { .. } => Self::Transport,
            ProviderError::Api { status, .. } => Self::Rejected { status: *status },
            ProviderError::Malformed { .. } => Self::Malformed,
            ProviderError::EmptyReply { .. } => Self::EmptyReply,
        }
    }
}

/// Result of one request/response cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Reply(String),
    Fallback(CompletionFailure),
}

impl ReplyOutcome {
    /// Text to deliver to the client for this outcome.
    pub fn into_text(self, config: &AssistantConfig) -> String {
        match self {
            Self::Reply(text) => text,
            Self::Fallback(failure) => fallback_reply(&failure, config).to_string(),
        }
    }
}

/// User-facing text for a failed completion. Every reason currently maps to
/// the single configured fallback so no backend detail leaks to the client.
pub fn fallback_reply<'a>(failure: &CompletionFailure, config: &'a AssistantConfig) -> &'a str {
    match failure {
        CompletionFailure::NotConfigured
        | CompletionFailure::Transport
        | CompletionFailure::Rejected { .. }
        | CompletionFailure::Malformed
        | CompletionFailure::EmptyReply
        | CompletionFailure::HistoryUnavailable => &config.fallback_reply,
    }
}
