use std::{
    path::{Path, PathBuf},
    sync::RwLock,
};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::ChefJuniorConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "chefjunior.toml",
    "chefjunior.yaml",
    "chefjunior.yml",
    "chefjunior.json",
];

static CONFIG_DIR_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Use `dir` instead of the user-global config directory.
pub fn set_config_dir(dir: PathBuf) {
    if let Ok(mut guard) = CONFIG_DIR_OVERRIDE.write() {
        *guard = Some(dir);
    }
}

/// Forget a directory set with [`set_config_dir`].
pub fn clear_config_dir() {
    if let Ok(mut guard) = CONFIG_DIR_OVERRIDE.write() {
        *guard = None;
    }
}

/// Returns the config directory: the override if set, else
/// `~/.config/chefjunior/`.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = CONFIG_DIR_OVERRIDE.read().ok().and_then(|g| g.clone()) {
        return Some(dir);
    }
    directories::ProjectDirs::from("", "", "chefjunior").map(|d| d.config_dir().to_path_buf())
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<ChefJuniorConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_config(&substitute_env(&raw), path)
}

/// Discover and load config from standard locations, then apply env
/// overrides.
///
/// Search order:
/// 1. `./chefjunior.{toml,yaml,yml,json}` (project-local)
/// 2. [`config_dir`]`/chefjunior.{toml,yaml,yml,json}`
///
/// Falls back to `ChefJuniorConfig::default()` if nothing is found or the
/// file fails to parse.
pub fn discover_and_load() -> ChefJuniorConfig {
    let mut config = match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                ChefJuniorConfig::default()
            })
        },
        None => {
            debug!("no config file found, using defaults");
            ChefJuniorConfig::default()
        },
    };
    apply_env_overrides(&mut config);
    config
}

/// Fill gaps in `config` from the process environment.
pub fn apply_env_overrides(config: &mut ChefJuniorConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(config: &mut ChefJuniorConfig, env: impl Fn(&str) -> Option<String>) {
    let openai_key = env("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());

    if config.providers.openai.api_key.is_none()
        && let Some(ref key) = openai_key
    {
        config.providers.openai.api_key = Some(Secret::new(key.clone()));
    }
    if config.voice.whisper.api_key.is_none()
        && let Some(key) = openai_key
    {
        config.voice.whisper.api_key = Some(Secret::new(key));
    }

    if let Some(bind) = env("CHEFJUNIOR_BIND") {
        config.server.bind = bind;
    }
    if let Some(port) = env("CHEFJUNIOR_PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => warn!(value = %port, "ignoring invalid CHEFJUNIOR_PORT"),
        }
    }
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    let local = CONFIG_FILENAMES.iter().map(PathBuf::from);
    let global = config_dir()
        .into_iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)));
    local.chain(global).find(|p| p.exists())
}

/// Returns the path of an existing config file, or the default TOML path.
pub fn find_or_default_config_path() -> PathBuf {
    find_config_file().unwrap_or_else(|| {
        config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chefjunior.toml")
    })
}

fn parse_config(raw: &str, path: &Path) -> Result<ChefJuniorConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        other => Err(Error::UnsupportedFormat(other.to_string())),
    }
}
