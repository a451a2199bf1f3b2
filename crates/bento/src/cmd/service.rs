//! Save and load commands - record model service lifecycle events
//!
//! # Usage
//!
//! ```bash
//! bento save services/iris.toml
//! bento load services/iris.toml
//! ```

use std::path::PathBuf;

use anyhow::Result;
use bento_telemetry::{Tracker, service_info};
use clap::Args;
use tracing::info;

use crate::manifest::ServiceManifest;

/// Arguments shared by `save` and `load`
#[derive(Args, Debug)]
pub struct ServiceArgs {
    /// Path to the service manifest (TOML)
    pub manifest: PathBuf,
}

/// Lifecycle step being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Save,
    Load,
}

impl Lifecycle {
    pub fn command(&self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Load => "load",
        }
    }
}

/// Run the save or load command
pub async fn run(step: Lifecycle, args: ServiceArgs, tracker: &Tracker) -> Result<()> {
    let manifest = ServiceManifest::from_file(&args.manifest)?;
    let snapshot = service_info(&manifest);

    info!(
        service = %manifest.tag(),
        artifacts = snapshot.artifact_types.len(),
        apis = snapshot.handler_types.len(),
        "{} model service",
        match step {
            Lifecycle::Save => "Saving",
            Lifecycle::Load => "Loading",
        }
    );

    match step {
        Lifecycle::Save => tracker.track_save(&manifest).await,
        Lifecycle::Load => tracker.track_load(&manifest).await,
    };

    println!("{} {}", step.command(), manifest.tag());
    println!(
        "  artifacts: {}",
        join_or_none(&snapshot.artifact_types)
    );
    println!("  handlers:  {}", join_or_none(&snapshot.handler_types));

    Ok(())
}

fn join_or_none(items: &[&str]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
