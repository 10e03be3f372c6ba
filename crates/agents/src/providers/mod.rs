pub mod openai;

use std::sync::Arc;

use chefjunior_config::{AssistantConfig, OpenAiConfig};

use crate::model::LlmProvider;

pub use openai::OpenAiProvider;

/// Build the chat completion provider described by the config.
///
/// A provider is always returned; without an API key every call fails with
/// [`crate::Error::NotConfigured`], which callers turn into their fallback.
pub fn from_config(openai: &OpenAiConfig, assistant: &AssistantConfig) -> Arc<dyn LlmProvider> {
    let provider = OpenAiProvider::new(
        openai.api_key.clone(),
        assistant.model.clone(),
        &openai.base_url,
    );
    if !provider.is_configured() {
        tracing::warn!("no OpenAI API key configured, chat replies will fall back");
    }
    Arc::new(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_uses_assistant_model() {
        let provider = from_config(&OpenAiConfig::default(), &AssistantConfig {
            model: "gpt-4o-mini".into(),
            ..Default::default()
        });
        assert_eq!(provider.id(), "gpt-4o-mini");
        assert_eq!(provider.name(), "openai");
    }
}
