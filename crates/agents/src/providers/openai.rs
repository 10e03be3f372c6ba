//! OpenAI Chat Completions provider.
//!
//! Works against any API speaking `POST {base_url}/chat/completions`.

use {
    async_trait::async_trait,
    reqwest::Client,
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    tracing::{debug, trace, warn},
};

use crate::{
    error::{Error, Result},
    model::{ChatMessage, CompletionOptions, CompletionResponse, LlmProvider, Usage},
};

const PROVIDER: &str = "openai";

pub struct OpenAiProvider {
    client: Client,
    api_key: Option<Secret<String>>,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiProvider {
    #[must_use]
    pub fn new(api_key: Option<Secret<String>>, model: impl Into<String>, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

fn should_warn_on_api_error(status: reqwest::StatusCode) -> bool {
    // 429 is routine under quota pressure and would flood the log.
    status != reqwest::StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn id(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(Error::NotConfigured { provider: PROVIDER })?;

        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: options.temperature,
        };

        debug!(
            model = %self.model,
            messages_count = messages.len(),
            "openai complete request"
        );

        let http_resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|source| Error::Transport {
                provider: PROVIDER,
                source,
            })?;

        let status = http_resp.status();
        if !status.is_success() {
            let body_text = http_resp.text().await.unwrap_or_default();
            if should_warn_on_api_error(status) {
                warn!(status = %status, model = %self.model, body = %body_text, "openai API error");
            } else {
                debug!(status = %status, model = %self.model, "openai rate limited");
            }
            return Err(Error::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                body: body_text,
            });
        }

        let raw = http_resp.text().await.map_err(|source| Error::Transport {
            provider: PROVIDER,
            source,
        })?;
        trace!(response = %raw, "openai raw response");

        let resp: ChatResponse =
            serde_json::from_str(&raw).map_err(|e| Error::malformed(PROVIDER, e))?;

        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.is_empty())
            .ok_or(Error::EmptyReply { provider: PROVIDER })?;

        let usage = resp
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse { text, usage })
    }
}

// ── API Types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        wiremock::{
            Mock, MockServer, ResponseTemplate,
            matchers::{body_partial_json, header, method, path},
        },
    };

    fn history() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("You are Dwane."),
            ChatMessage::user("What can I bake with bananas?"),
        ]
    }

    fn provider(server: &MockServer) -> OpenAiProvider {
        OpenAiProvider::new(Some(Secret::new("test-key".into())), "gpt-4", &server.uri())
    }

    #[test]
    fn debug_redacts_api_key() {
        let provider = OpenAiProvider::new(
            Some(Secret::new("super-secret".into())),
            "gpt-4",
            "https://api.openai.com/v1/",
        );
        let out = format!("{provider:?}");
        assert!(out.contains("[REDACTED]"));
        assert!(!out.contains("super-secret"));
        assert_eq!(provider.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn rate_limits_are_not_warnings() {
        assert!(!should_warn_on_api_error(
            reqwest::StatusCode::TOO_MANY_REQUESTS
        ));
        assert!(should_warn_on_api_error(reqwest::StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let provider = OpenAiProvider::new(None, "gpt-4", "http://127.0.0.1:9");
        assert!(!provider.is_configured());
        let err = provider
            .complete(&history(), &CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotConfigured { .. }));
    }

    #[tokio::test]
    async fn sends_full_history_model_and_temperature() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4",
                "temperature": 0.7,
                "messages": [
                    { "role": "system", "content": "You are Dwane." },
                    { "role": "user", "content": "What can I bake with bananas?" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "Banana bread!" } }],
                "usage": { "prompt_tokens": 12, "completion_tokens": 3 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = provider(&server)
            .complete(&history(), &CompletionOptions { temperature: 0.7 })
            .await
            .unwrap();
        assert_eq!(resp.text, "Banana bread!");
        assert_eq!(resp.usage, Usage {
            input_tokens: 12,
            output_tokens: 3,
        });
    }

    #[tokio::test]
    async fn api_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid api key"}"#),
            )
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete(&history(), &CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api { status: 401, .. }));
        assert!(err.to_string().contains("invalid api key"));
    }

    #[tokio::test]
    async fn garbage_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete(&history(), &CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[tokio::test]
    async fn missing_content_is_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": null } }]
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete(&history(), &CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyReply { .. }));
    }

    #[tokio::test]
    async fn whitespace_content_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": " \n" } }]
            })))
            .mount(&server)
            .await;

        let resp = provider(&server)
            .complete(&history(), &CompletionOptions::default())
            .await
            .unwrap();
        assert_eq!(resp.text, " \n");
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let provider = OpenAiProvider::new(Some(Secret::new("k".into())), "gpt-4", "http://127.0.0.1:9");
        let err = provider
            .complete(&history(), &CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}
