mod config_commands;

use std::sync::Arc;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use chefjunior_chat::{InMemoryHistoryStore, NullSink};

#[derive(Parser)]
#[command(name = "chefjunior", about = "ChefJunior: cooking assistant backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
    /// Custom config directory (overrides default ~/.config/chefjunior/).
    #[arg(long, global = true, env = "CHEFJUNIOR_CONFIG_DIR")]
    config_dir: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server (default when no subcommand is provided).
    Gateway,
    /// Ask the assistant one question and print the reply.
    Ask {
        #[arg(short, long)]
        message: String,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "chefjunior starting");

    if let Some(ref dir) = cli.config_dir {
        chefjunior_config::set_config_dir(dir.clone());
    }
    let mut config = chefjunior_config::discover_and_load();
    // CLI args override config values
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command {
        // Default: start gateway when no subcommand is provided
        None | Some(Commands::Gateway) => chefjunior_gateway::server::start_gateway(config).await,
        Some(Commands::Ask { message }) => {
            let engine = chefjunior_gateway::services::engine_from_config(
                &config,
                Arc::new(InMemoryHistoryStore::new()),
                Arc::new(NullSink),
            );
            let reply = engine.handle_text("cli", &message).await;
            println!("{reply}");
            Ok(())
        },
        Some(Commands::Config { action }) => config_commands::handle_config(action, &config),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_gateway() {
        let cli = Cli::try_parse_from(["chefjunior", "--port", "9001"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.port, Some(9001));
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn ask_requires_message() {
        assert!(Cli::try_parse_from(["chefjunior", "ask"]).is_err());
        let cli = Cli::try_parse_from(["chefjunior", "ask", "-m", "What is a roux?"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Ask { ref message }) if message == "What is a roux?"));
    }

    #[test]
    fn config_subcommands_parse() {
        let cli = Cli::try_parse_from(["chefjunior", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: config_commands::ConfigAction::Init { force: true }
            })
        ));
        let cli = Cli::try_parse_from(["chefjunior", "--json-logs", "config", "check"]).unwrap();
        assert!(cli.json_logs);
    }
}
