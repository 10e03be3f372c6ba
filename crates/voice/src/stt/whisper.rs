//! OpenAI Whisper STT provider implementation.

use {
    anyhow::{Context, Result, anyhow, bail},
    async_trait::async_trait,
    reqwest::{
        Client,
        multipart::{Form, Part},
    },
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    tracing::debug,
};

use super::{SttProvider, TranscribeRequest, Transcript};

/// OpenAI API base URL.
const API_BASE: &str = "https://api.openai.com/v1";

/// Default Whisper model.
const DEFAULT_MODEL: &str = "whisper-1";

/// OpenAI Whisper STT provider.
#[derive(Clone)]
pub struct WhisperStt {
    client: Client,
    api_key: Option<Secret<String>>,
    model: String,
    base_url: String,
    language: Option<String>,
}

impl std::fmt::Debug for WhisperStt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperStt")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl WhisperStt {
    /// Create a Whisper provider using `whisper-1` on the public API.
    #[must_use]
    pub fn new(api_key: Option<Secret<String>>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: DEFAULT_MODEL.into(),
            base_url: API_BASE.into(),
            language: None,
        }
    }

    /// Create with custom model and language hint.
    #[must_use]
    pub fn with_options(
        api_key: Option<Secret<String>>,
        model: Option<String>,
        language: Option<String>,
    ) -> Self {
        Self {
            model: model.unwrap_or_else(|| DEFAULT_MODEL.into()),
            language,
            ..Self::new(api_key)
        }
    }

    /// Point the provider at a different API root (tests, proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn get_api_key(&self) -> Result<&Secret<String>> {
        self.api_key
            .as_ref()
            .ok_or_else(|| anyhow!("OpenAI API key not configured for Whisper"))
    }
}

#[async_trait]
impl SttProvider for WhisperStt {
    fn id(&self) -> &'static str {
        "whisper"
    }

    fn name(&self) -> &'static str {
        "OpenAI Whisper"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn transcribe(&self, request: TranscribeRequest) -> Result<Transcript> {
        let api_key = self.get_api_key()?;

        debug!(
            filename = %request.filename,
            content_type = %request.content_type,
            bytes = request.audio.len(),
            model = %self.model,
            "whisper transcription request"
        );

        let file_part = Part::bytes(request.audio.to_vec())
            .file_name(request.filename)
            .mime_str(&request.content_type)
            .context("failed to create file part")?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "json");

        if let Some(language) = request.language.or_else(|| self.language.clone()) {
            form = form.text("language", language);
        }

        if let Some(prompt) = request.prompt {
            form = form.text("prompt", prompt);
        }

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .context("failed to send Whisper transcription request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Whisper transcription request failed: {status} - {body}");
        }

        let whisper_response: WhisperResponse = response
            .json()
            .await
            .context("failed to parse Whisper response")?;

        let text = whisper_response.text.trim();
        if text.is_empty() {
            bail!("Whisper returned an empty transcript");
        }

        Ok(Transcript {
            text: text.to_string(),
            language: whisper_response.language,
            duration_seconds: whisper_response.duration,
        })
    }
}

// ── API Types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f32>,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        bytes::Bytes,
        wiremock::{
            Mock, MockServer, ResponseTemplate,
            matchers::{header, method, path},
        },
    };

    fn request() -> TranscribeRequest {
        TranscribeRequest::new(Bytes::from_static(b"fake audio"), "voice.webm", "audio/webm")
    }

    #[test]
    fn test_provider_metadata() {
        let provider = WhisperStt::new(None);
        assert_eq!(provider.id(), "whisper");
        assert_eq!(provider.name(), "OpenAI Whisper");
        assert!(!provider.is_configured());

        let configured = WhisperStt::new(Some(Secret::new("test-key".into())));
        assert!(configured.is_configured());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let provider = WhisperStt::new(Some(Secret::new("super-secret-key".into())));
        let debug_output = format!("{provider:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-key"));
    }

    #[test]
    fn test_with_options() {
        let provider = WhisperStt::with_options(
            Some(Secret::new("key".into())),
            Some("whisper-large-v3".into()),
            Some("en".into()),
        )
        .with_base_url("http://localhost:1234/v1/");
        assert_eq!(provider.model, "whisper-large-v3");
        assert_eq!(provider.language.as_deref(), Some("en"));
        assert_eq!(provider.base_url, "http://localhost:1234/v1");
    }

    #[tokio::test]
    async fn test_transcribe_without_api_key() {
        let result = WhisperStt::new(None).transcribe(request()).await;
        assert!(result.unwrap_err().to_string().contains("not configured"));
    }

    #[test]
    fn test_whisper_response_minimal() {
        let response: WhisperResponse = serde_json::from_str(r#"{"text": "Hello"}"#).unwrap();
        assert_eq!(response.text, "Hello");
        assert!(response.language.is_none());
        assert!(response.duration.is_none());
    }

    // ── Integration Tests with Mock Server ─────────────────────────────────

    mod integration {
        use super::*;

        #[tokio::test]
        async fn test_transcribe_success() {
            let mock_server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path("/audio/transcriptions"))
                .and(header("authorization", "Bearer test-key"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_string(r#"{"text": "  How long do I knead dough?  "}"#),
                )
                .expect(1)
                .mount(&mock_server)
                .await;

            let provider = WhisperStt::new(Some(Secret::new("test-key".into())))
                .with_base_url(mock_server.uri());

            let result = provider.transcribe(request()).await.unwrap();
            assert_eq!(result.text, "How long do I knead dough?");
        }

        #[tokio::test]
        async fn test_transcribe_api_error() {
            let mock_server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path("/audio/transcriptions"))
                .respond_with(
                    ResponseTemplate::new(400).set_body_string(r#"{"error": "Invalid file format."}"#),
                )
                .mount(&mock_server)
                .await;

            let provider = WhisperStt::new(Some(Secret::new("test-key".into())))
                .with_base_url(mock_server.uri());

            let err = provider.transcribe(request()).await.unwrap_err();
            assert!(err.to_string().contains("400"));
        }

        #[tokio::test]
        async fn test_blank_transcript_is_an_error() {
            let mock_server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path("/audio/transcriptions"))
                .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"text": "   "}"#))
                .mount(&mock_server)
                .await;

            let provider = WhisperStt::new(Some(Secret::new("test-key".into())))
                .with_base_url(mock_server.uri());

            let err = provider.transcribe(request()).await.unwrap_err();
            assert!(err.to_string().contains("empty transcript"));
        }
    }
}
