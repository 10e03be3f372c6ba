//! Speech-to-Text provider abstraction and implementations.

mod whisper;

pub use whisper::WhisperStt;

use {
    anyhow::Result,
    async_trait::async_trait,
    bytes::Bytes,
    serde::{Deserialize, Serialize},
};

/// Request to transcribe one uploaded recording.
#[derive(Debug, Clone)]
pub struct TranscribeRequest {
    /// Raw audio data, passed through untouched.
    pub audio: Bytes,
    /// File name reported to the provider; its extension is used for format
    /// sniffing.
    pub filename: String,
    /// Declared MIME type, e.g. `audio/webm`.
    pub content_type: String,
    /// Language hint (ISO 639-1 code, e.g., "en", "es", "fr").
    pub language: Option<String>,
    /// Optional prompt to guide transcription (context, terminology).
    pub prompt: Option<String>,
}

impl TranscribeRequest {
    pub fn new(audio: Bytes, filename: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            audio,
            filename: filename.into(),
            content_type: content_type.into(),
            language: None,
            prompt: None,
        }
    }
}

/// Transcription result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Transcribed text, trimmed and never empty.
    pub text: String,
    /// Detected language (ISO 639-1 code).
    pub language: Option<String>,
    /// Duration of audio in seconds.
    pub duration_seconds: Option<f32>,
}

/// Speech-to-Text provider trait.
#[async_trait]
pub trait SttProvider: Send + Sync {
    /// Provider identifier (e.g., "whisper").
    fn id(&self) -> &'static str;

    /// Human-readable provider name.
    fn name(&self) -> &'static str;

    /// Check if the provider is configured and ready.
    fn is_configured(&self) -> bool;

    /// Transcribe audio to text.
    async fn transcribe(&self, request: TranscribeRequest) -> Result<Transcript>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_have_no_hints() {
        let request = TranscribeRequest::new(
            Bytes::from_static(b"fake audio data"),
            "voice.webm",
            "audio/webm",
        );
        assert_eq!(request.filename, "voice.webm");
        assert_eq!(request.content_type, "audio/webm");
        assert!(request.language.is_none());
        assert!(request.prompt.is_none());
    }
}
