//! Inventory assistant sidebar server and terminal chat.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use ai_sidebar::config::{AppConfig, Cli, Command};
use ai_sidebar::{server, terminal};
use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before clap reads env-backed flags
    let _ = dotenv();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve);

    init_tracing(command)?;

    let config = Arc::new(AppConfig::from_cli(&cli)?);
    tracing::debug!(config = ?config, "Configuration loaded");

    match command {
        Command::Serve => server::start_server(config).await,
        Command::Chat => terminal::run(&config).await,
    }
}

/// Initialize tracing (M-LOG-STRUCTURED).
///
/// `LOG_FORMAT=json` switches to JSON lines. The terminal chat logs to
/// stderr at `warn` unless `RUST_LOG` says otherwise, keeping stdout for the
/// conversation.
fn init_tracing(command: Command) -> anyhow::Result<()> {
    let default_level = match command {
        Command::Serve => "info",
        Command::Chat => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}
