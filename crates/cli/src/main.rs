//! gemfarm CLI — the main entry point.
//!
//! Commands:
//! - `run`          — Start the farm loop
//! - `doctor`       — Diagnose setup problems
//! - `config`       — Show, validate, or locate the config file
//! - `notify-test`  — Send a test alert through every notifier
//! - `onboard`      — Create the config directory and a default config

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gemfarm",
    about = "gemfarm — paced OwO farming with challenge pauses and gem upkeep",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "GEMFARM_LOG_JSON")]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the farm loop
    Run {
        /// Stop after this many minutes (overrides runtime.max_runtime_minutes)
        #[arg(long, env = "GEMFARM_MAX_RUNTIME_MINUTES")]
        max_runtime_minutes: Option<u64>,
    },

    /// Diagnose setup problems
    Doctor,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Send a test alert through every configured notifier
    NotifyTest,

    /// Create the config directory and a default config file
    Onboard,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (secrets redacted)
    Show,
    /// Parse and validate the configuration
    Validate,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    match cli.command {
        Commands::Run {
            max_runtime_minutes,
        } => commands::run::run(max_runtime_minutes).await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Validate => commands::config_cmd::validate().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
        Commands::NotifyTest => commands::notify::run().await?,
        Commands::Onboard => commands::onboard::run().await?,
    }

    Ok(())
}
