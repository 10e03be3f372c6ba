//! Semantic checks on a loaded configuration.

use crate::schema::ChefJuniorConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "range", "empty", "credentials"
    pub category: &'static str,
    /// Dotted path, e.g. "assistant.temperature"
    pub path: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(
        &mut self,
        severity: Severity,
        category: &'static str,
        path: &'static str,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(Diagnostic {
            severity,
            category,
            path,
            message: message.into(),
        });
    }
}

/// Validate `config`, returning every problem found.
pub fn validate(config: &ChefJuniorConfig) -> ValidationResult {
    let mut result = ValidationResult::default();
    let assistant = &config.assistant;

    if !(0.0..=2.0).contains(&assistant.temperature) {
        result.push(
            Severity::Error,
            "range",
            "assistant.temperature",
            format!("{} is outside 0.0..=2.0", assistant.temperature),
        );
    }

    let required = [
        ("assistant.persona_prompt", &assistant.persona_prompt),
        ("assistant.greeting", &assistant.greeting),
        ("assistant.model", &assistant.model),
        ("assistant.fallback_reply", &assistant.fallback_reply),
        (
            "assistant.transcription_fallback",
            &assistant.transcription_fallback,
        ),
        ("voice.whisper.model", &config.voice.whisper.model),
    ];
    for (path, value) in required {
        if value.trim().is_empty() {
            result.push(Severity::Error, "empty", path, "must not be empty");
        }
    }

    if config.providers.openai.api_key.is_none() {
        result.push(
            Severity::Warning,
            "credentials",
            "providers.openai.api_key",
            "no API key configured; every reply will be the fallback text",
        );
    }
    if config.voice.whisper.api_key.is_none() && config.providers.openai.api_key.is_none() {
        result.push(
            Severity::Warning,
            "credentials",
            "voice.whisper.api_key",
            "no API key configured; audio uploads cannot be transcribed",
        );
    }

    result
}
