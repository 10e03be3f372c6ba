use std::path::Path;

use {
    anyhow::{Context, Result},
    clap::Subcommand,
};

use chefjunior_config::{ChefJuniorConfig, Severity, template::default_config_template};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the effective configuration and report errors/warnings.
    Check,
    /// Print the effective configuration as TOML, API keys redacted.
    Show,
    /// Write a documented config template to the config directory.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
}

pub fn handle_config(action: ConfigAction, config: &ChefJuniorConfig) -> Result<()> {
    match action {
        ConfigAction::Check => check(config),
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(&config.redacted())?);
            Ok(())
        },
        ConfigAction::Init { force } => {
            let path = chefjunior_config::find_or_default_config_path();
            if write_template(&path, config.server.port, force)? {
                eprintln!("Wrote {}", path.display());
            } else {
                eprintln!(
                    "{} already exists; pass --force to overwrite.",
                    path.display()
                );
            }
            Ok(())
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(config: &ChefJuniorConfig) -> Result<()> {
    let result = chefjunior_config::validate(config);
    eprintln!(
        "Checking {}\n",
        chefjunior_config::find_or_default_config_path().display()
    );

    for d in &result.diagnostics {
        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
        };
        eprintln!(
            "  {BOLD}{color}{label}{RESET} [{}] {}: {}",
            d.category, d.path, d.message
        );
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);
    if !result.diagnostics.is_empty() {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

/// Returns `false` without touching the file when it exists and `force` is off.
fn write_template(path: &Path, port: u16, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, default_config_template(port))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}
