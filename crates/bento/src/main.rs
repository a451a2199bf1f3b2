//! Bento - model service CLI with anonymous usage tracking
//!
//! # Usage
//!
//! ```bash
//! # Record a save / load of a model service
//! bento save services/iris.toml
//! bento load services/iris.toml
//!
//! # Deploy to a platform
//! bento deploy services/iris.toml --platform aws-lambda
//!
//! # Inspect usage tracking
//! bento telemetry status
//! bento telemetry show --event cli-deploy --platform aws-lambda
//! ```

mod cmd;
mod manifest;

use std::path::Path;

use anyhow::Result;
use bento_config::{Config, ConfigError, LogFormat};
use bento_telemetry::Tracker;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cmd::service::Lifecycle;

/// Bento - model service CLI
#[derive(Parser, Debug)]
#[command(name = "bento")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save a model service
    Save(cmd::service::ServiceArgs),

    /// Load a model service
    Load(cmd::service::ServiceArgs),

    /// Deploy a model service to a platform
    Deploy(cmd::deploy::DeployArgs),

    /// Inspect usage tracking
    Telemetry(cmd::telemetry::TelemetryArgs),
}

impl Command {
    /// Name reported in `cli-<name>` events
    fn name(&self) -> &'static str {
        match self {
            Self::Save(_) => "save",
            Self::Load(_) => "load",
            Self::Deploy(_) => "deploy",
            Self::Telemetry(_) => "telemetry",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = load_config(cli.config.as_deref());
    let log_level = resolve_log_level(cli.log_level.as_deref(), &config);
    init_logging(&log_level, config.log.format)?;
    if let Some(e) = config_error {
        warn!(error = %e, "Failed to load config, continuing with usage tracking disabled");
    }

    let tracker = Tracker::from_config(&config);
    dispatch(cli.command, &tracker).await
}

/// Load config without ever failing the command.
///
/// On error the defaults are used with usage tracking off; the error is
/// returned for logging once the subscriber is up.
fn load_config(path: Option<&Path>) -> (Config, Option<ConfigError>) {
    match Config::load(path) {
        Ok(config) => (config, None),
        Err(e) => {
            let mut config = Config::default();
            config.core.usage_tracking = false;
            (config, Some(e))
        }
    }
}

/// Run a command and report its usage events.
async fn dispatch(command: Command, tracker: &Tracker) -> Result<()> {
    let command_name = command.name();

    match command {
        Command::Save(args) => {
            cmd::service::run(Lifecycle::Save, args, tracker).await?;
            tracker.track_cli(command_name, None).await;
        }
        Command::Load(args) => {
            cmd::service::run(Lifecycle::Load, args, tracker).await?;
            tracker.track_cli(command_name, None).await;
        }
        // Deploy reports its own cli event, carrying the platform
        Command::Deploy(args) => cmd::deploy::run(args, tracker).await?,
        // Inspection never sends
        Command::Telemetry(args) => cmd::telemetry::run(args, tracker)?,
    }

    Ok(())
}

/// Resolve log level: CLI flag > config file > default "info"
fn resolve_log_level(cli_level: Option<&str>, config: &Config) -> String {
    match cli_level {
        Some(level) => level.to_string(),
        None => config.log.level.as_str().to_string(),
    }
}

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr so command output on stdout stays parseable.
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Console => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}
