//! Configuration loading, validation, and env substitution.
//!
//! Config files: `chefjunior.toml`, `chefjunior.yaml`, or `chefjunior.json`
//! Searched in `./` then `~/.config/chefjunior/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod template;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{
        apply_env_overrides, clear_config_dir, config_dir, discover_and_load,
        find_or_default_config_path, load_config, set_config_dir,
    },
    schema::{
        AssistantConfig, ChefJuniorConfig, OpenAiConfig, ProvidersConfig, ServerConfig,
        VoiceConfig, WhisperConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
