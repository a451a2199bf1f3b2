//! Telemetry command - show exactly what usage tracking sends
//!
//! Nothing is sent by this command.
//!
//! # Usage
//!
//! ```bash
//! # Show the event a deploy would send
//! bento telemetry show --event cli-deploy --platform aws-lambda
//!
//! # Show a save event for a service
//! bento telemetry show --event save --manifest services/iris.toml
//!
//! # Is tracking on, and with which session / channel?
//! bento telemetry status
//! ```

use std::path::PathBuf;

use anyhow::Result;
use bento_telemetry::{EventProperties, Tracker, cli_info, service_info};
use clap::{Args, Subcommand};
use serde_json::Value;

use crate::manifest::ServiceManifest;

/// Telemetry command arguments
#[derive(Args, Debug)]
pub struct TelemetryArgs {
    #[command(subcommand)]
    pub command: TelemetryCommand,
}

#[derive(Subcommand, Debug)]
pub enum TelemetryCommand {
    /// Show the form fields an event would be sent with
    Show(ShowArgs),

    /// Show whether tracking is enabled and how it is set up
    Status,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Event type to preview (save, load, cli-<command>)
    #[arg(short, long, default_value = "cli-telemetry")]
    pub event: String,

    /// Service manifest whose info populates the properties
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Deploy platform for CLI events
    #[arg(short, long)]
    pub platform: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the telemetry command
pub fn run(args: TelemetryArgs, tracker: &Tracker) -> Result<()> {
    match args.command {
        TelemetryCommand::Show(show_args) => run_show(show_args, tracker),
        TelemetryCommand::Status => {
            print_status(tracker);
            Ok(())
        }
    }
}

fn run_show(args: ShowArgs, tracker: &Tracker) -> Result<()> {
    let properties = preview_properties(&args)?;
    let fields = tracker.preview(&args.event, &properties)?;

    if args.json {
        let mut body = serde_json::Map::new();
        for (key, value) in fields {
            // The event field is itself JSON; show it structured.
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            body.insert(key.to_string(), value);
        }
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print_status(tracker);
        println!("Request body (form fields):");
        for (key, value) in fields {
            println!("  {} = {}", key, value);
        }
    }

    Ok(())
}

fn preview_properties(args: &ShowArgs) -> Result<EventProperties> {
    let mut properties = match args.manifest {
        Some(ref path) => service_info(&ServiceManifest::from_file(path)?).into_properties(),
        None => EventProperties::new(),
    };
    properties.extend(cli_info(args.platform.as_deref()));
    Ok(properties)
}

fn print_status(tracker: &Tracker) {
    let build = tracker.build_info();

    println!("Bento Usage Tracking");
    println!("====================");
    println!();
    if tracker.is_enabled() {
        println!("Status:   ENABLED");
    } else {
        println!("Status:   DISABLED (no data will be sent)");
    }
    println!("Endpoint: {}", tracker.endpoint().url);
    println!("Timeout:  {}ms", tracker.endpoint().timeout.as_millis());
    println!("Session:  {}", tracker.session());
    println!(
        "Channel:  {} (version {}{})",
        build.channel(),
        build.version,
        if build.dirty { ", dirty" } else { "" }
    );
    if !tracker.has_api_key() {
        println!("API key:  not configured for this channel (events are skipped)");
    }
    println!();
    println!("To disable usage tracking, add to your config:");
    println!("  [core]");
    println!("  usage_tracking = false");
    println!("or set BENTOML_DO_NOT_TRACK=1");
    println!();
}
