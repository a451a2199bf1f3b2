//! Service manifest - a model service described in TOML
//!
//! ```toml
//! name = "IrisClassifier"
//! version = "20191010_A1B2C3"
//!
//! [[artifacts]]
//! name = "model"
//! kind = "sklearn"
//!
//! [[apis]]
//! name = "predict"
//! handler = "dataframe"
//!
//! [env]
//! pip_dependencies = ["scikit-learn", "pandas"]
//! ```

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use bento_telemetry::{ModelService, ServiceApi, ServiceArtifact, ServiceEnv};
use serde::Deserialize;

/// A model service loaded from a manifest file
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceManifest {
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub artifacts: Vec<ServiceArtifact>,

    #[serde(default)]
    pub apis: Vec<ServiceApi>,

    #[serde(default)]
    pub env: ServiceEnv,
}

impl ServiceManifest {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest '{}'", path.display()))?;
        contents
            .parse()
            .with_context(|| format!("invalid manifest '{}'", path.display()))
    }

    /// `name:version`, or just the name when unversioned
    pub fn tag(&self) -> String {
        match self.version {
            Some(ref version) => format!("{}:{}", self.name, version),
            None => self.name.clone(),
        }
    }
}

impl FromStr for ServiceManifest {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl ModelService for ServiceManifest {
    fn artifacts(&self) -> &[ServiceArtifact] {
        &self.artifacts
    }

    fn apis(&self) -> &[ServiceApi] {
        &self.apis
    }

    fn env(&self) -> &ServiceEnv {
        &self.env
    }
}
