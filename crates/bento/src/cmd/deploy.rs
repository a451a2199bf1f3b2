//! Deploy command - record a deployment to a target platform
//!
//! # Usage
//!
//! ```bash
//! bento deploy services/iris.toml --platform aws-lambda
//! ```

use std::path::PathBuf;

use anyhow::Result;
use bento_telemetry::Tracker;
use clap::{Args, ValueEnum};
use tracing::info;

use crate::manifest::ServiceManifest;

/// Deploy command arguments
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Path to the service manifest (TOML)
    pub manifest: PathBuf,

    /// Deployment target
    #[arg(short, long, value_enum)]
    pub platform: Platform,
}

/// Supported deployment targets
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    AwsLambda,
    AwsSagemaker,
    GcpFunction,
    AzureFunctions,
    Kubernetes,
}

impl Platform {
    /// Name reported in the event's `platform` property
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwsLambda => "aws-lambda",
            Self::AwsSagemaker => "aws-sagemaker",
            Self::GcpFunction => "gcp-function",
            Self::AzureFunctions => "azure-functions",
            Self::Kubernetes => "kubernetes",
        }
    }
}

/// Run the deploy command
pub async fn run(args: DeployArgs, tracker: &Tracker) -> Result<()> {
    let manifest = ServiceManifest::from_file(&args.manifest)?;
    let platform = args.platform.as_str();

    info!(service = %manifest.tag(), platform, "Deploying model service");
    tracker.track_cli("deploy", Some(platform)).await;

    println!("deploy {} -> {}", manifest.tag(), platform);
    Ok(())
}
