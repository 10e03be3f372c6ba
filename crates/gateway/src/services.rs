//! Wires the collaborators named in the config into a conversation engine.

use std::sync::Arc;

use {
    chefjunior_chat::{ConversationEngine, HistoryStore, InMemoryHistoryStore, MessageSink},
    chefjunior_config::{ChefJuniorConfig, OpenAiConfig, WhisperConfig},
    chefjunior_voice::{SttProvider, WhisperStt},
    tracing::warn,
};

use crate::state::{ConnectionRegistry, GatewayState};

/// Build the Whisper provider, borrowing the OpenAI key and base URL when
/// the voice section leaves them unset.
pub fn whisper_from_config(whisper: &WhisperConfig, openai: &OpenAiConfig) -> WhisperStt {
    let api_key = whisper
        .api_key
        .clone()
        .or_else(|| openai.api_key.clone());
    if api_key.is_none() {
        warn!("no Whisper API key configured, audio uploads will fall back");
    }
    let base_url = whisper.base_url.as_deref().unwrap_or(&openai.base_url);
    WhisperStt::with_options(api_key, Some(whisper.model.clone()), whisper.language.clone())
        .with_base_url(base_url)
}

/// Build an engine backed by the configured OpenAI collaborators.
pub fn engine_from_config(
    config: &ChefJuniorConfig,
    history: Arc<dyn HistoryStore>,
    sink: Arc<dyn MessageSink>,
) -> ConversationEngine {
    let llm = chefjunior_agents::providers::from_config(&config.providers.openai, &config.assistant);
    let stt: Arc<dyn SttProvider> = Arc::new(whisper_from_config(
        &config.voice.whisper,
        &config.providers.openai,
    ));
    ConversationEngine::new(config.assistant.clone(), llm, stt, history, sink)
}

/// Production state: in-memory history, OpenAI collaborators, and a fresh
/// registry acting as the engine's delivery sink.
pub fn gateway_state_from_config(config: &ChefJuniorConfig) -> Arc<GatewayState> {
    let registry = Arc::new(ConnectionRegistry::new());
    let engine = engine_from_config(
        config,
        Arc::new(InMemoryHistoryStore::new()),
        registry.clone(),
    );
    GatewayState::new(registry, Arc::new(engine), config.server.ws_request_logs)
}

#[cfg(test)]
mod tests {
    use {super::*, secrecy::Secret};

    #[test]
    fn whisper_borrows_openai_key() {
        let openai = OpenAiConfig {
            api_key: Some(Secret::new("sk-test".into())),
            ..Default::default()
        };
        let stt = whisper_from_config(&WhisperConfig::default(), &openai);
        assert!(stt.is_configured());
    }

    #[test]
    fn whisper_without_any_key_is_unconfigured() {
        let stt = whisper_from_config(&WhisperConfig::default(), &OpenAiConfig::default());
        assert!(!stt.is_configured());
    }

    #[tokio::test]
    async fn state_starts_empty() {
        let state = gateway_state_from_config(&ChefJuniorConfig::default());
        assert_eq!(state.registry.client_count().await, 0);
        assert_eq!(state.engine.active_conversations().await, 0);
        assert!(!state.ws_request_logs);
    }
}
