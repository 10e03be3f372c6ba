//! Config schema types (server, assistant, providers, voice).

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Persona prompt seeded as the first (`system`) turn of every conversation.
pub const DEFAULT_PERSONA_PROMPT: &str = "\
You are 'Dwane', a friendly and encouraging cooking assistant for the ChefJunior App.
Your audience is primarily kids and beginners learning to cook.
Your personality should be:
- Fun and engaging
- Patient and helpful
- Full of positive reinforcement (\"Great job!\", \"Awesome!\", \"You're a natural!\")

Your main tasks are:
1.  Guide users through recipes step-by-step.
2.  Answer cooking-related questions.
3.  Provide fun facts about ingredients.
4.  Keep the conversation on the topic of cooking.

When a user starts a conversation, introduce yourself warmly and ask how you can help them in the kitchen today.";

pub const DEFAULT_GREETING: &str =
    "Hello! I'm Dwane, your personal cooking assistant. What would you like to cook today?";

pub const DEFAULT_FALLBACK_REPLY: &str =
    "I'm sorry, something went wrong. Can you please ask me again?";

pub const DEFAULT_TRANSCRIPTION_FALLBACK: &str =
    "Sorry, I couldn't understand that recording. Can you try again?";

pub const DEFAULT_TRANSCRIPTION_ECHO_PREFIX: &str = "🎤 You said: ";

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_WHISPER_MODEL: &str = "whisper-1";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChefJuniorConfig {
    pub server: ServerConfig,
    pub assistant: AssistantConfig,
    pub providers: ProvidersConfig,
    pub voice: VoiceConfig,
}

impl ChefJuniorConfig {
    /// Copy of the config with every API key replaced by a placeholder,
    /// suitable for printing.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        let mask = |key: &mut Option<Secret<String>>| {
            if key.is_some() {
                *key = Some(Secret::new("[REDACTED]".into()));
            }
        };
        mask(&mut cfg.providers.openai.api_key);
        mask(&mut cfg.voice.whisper.api_key);
        cfg
    }
}

/// Listener settings for the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    pub port: u16,
    /// Log every inbound WebSocket frame (size only, never content).
    pub ws_request_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8000,
            ws_request_logs: false,
        }
    }
}

/// Conversation assistant settings. These are fixed for the lifetime of the
/// process; they are not per-request parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub persona_prompt: String,
    /// First frame sent on every newly opened channel.
    pub greeting: String,
    /// Chat completion model id.
    pub model: String,
    pub temperature: f32,
    /// Sent instead of a reply when the chat completion call fails.
    pub fallback_reply: String,
    /// Sent when an uploaded recording cannot be transcribed.
    pub transcription_fallback: String,
    /// Prepended to the transcribed text in the "you said" notice.
    pub transcription_echo_prefix: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            persona_prompt: DEFAULT_PERSONA_PROMPT.into(),
            greeting: DEFAULT_GREETING.into(),
            model: DEFAULT_CHAT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            fallback_reply: DEFAULT_FALLBACK_REPLY.into(),
            transcription_fallback: DEFAULT_TRANSCRIPTION_FALLBACK.into(),
            transcription_echo_prefix: DEFAULT_TRANSCRIPTION_ECHO_PREFIX.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: OpenAiConfig,
}

/// OpenAI chat completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key (from OPENAI_API_KEY env or config).
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_option_secret",
        deserialize_with = "deserialize_option_secret"
    )]
    pub api_key: Option<Secret<String>>,
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub whisper: WhisperConfig,
}

/// OpenAI Whisper transcription settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhisperConfig {
    /// Falls back to `providers.openai.api_key` when unset.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_option_secret",
        deserialize_with = "deserialize_option_secret"
    )]
    pub api_key: Option<Secret<String>>,
    /// Falls back to `providers.openai.base_url` when unset.
    pub base_url: Option<String>,
    pub model: String,
    /// Language hint (ISO 639-1 code).
    pub language: Option<String>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: DEFAULT_WHISPER_MODEL.into(),
            language: None,
        }
    }
}

// ── Secret serialization helpers ───────────────────────────────────────────

fn serialize_option_secret<S>(
    value: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

fn deserialize_option_secret<'de, D>(deserializer: D) -> Result<Option<Secret<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.trim().is_empty()).map(Secret::new))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_assistant_constants() {
        let cfg = ChefJuniorConfig::default();
        assert_eq!(cfg.assistant.model, "gpt-4");
        assert!((cfg.assistant.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(cfg.voice.whisper.model, "whisper-1");
        assert_eq!(cfg.server.port, 8000);
        assert!(cfg.assistant.persona_prompt.starts_with("You are 'Dwane'"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: ChefJuniorConfig = toml::from_str(
            r#"
            [assistant]
            temperature = 0.2

            [providers.openai]
            api_key = "sk-abc"
            "#,
        )
        .unwrap();
        assert!((cfg.assistant.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(cfg.assistant.greeting, DEFAULT_GREETING);
        assert_eq!(
            cfg.providers.openai.api_key.unwrap().expose_secret(),
            "sk-abc"
        );
        assert_eq!(cfg.providers.openai.base_url, DEFAULT_OPENAI_BASE_URL);
    }

    #[test]
    fn blank_api_key_is_treated_as_missing() {
        let cfg: ChefJuniorConfig = toml::from_str(
            r#"
            [voice.whisper]
            api_key = "  "
            "#,
        )
        .unwrap();
        assert!(cfg.voice.whisper.api_key.is_none());
    }

    #[test]
    fn redacted_hides_keys() {
        let mut cfg = ChefJuniorConfig::default();
        cfg.providers.openai.api_key = Some(Secret::new("sk-live".into()));
        let out = toml::to_string(&cfg.redacted()).unwrap();
        assert!(out.contains("[REDACTED]"));
        assert!(!out.contains("sk-live"));
    }
}
