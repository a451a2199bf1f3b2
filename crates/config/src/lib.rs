//! Bento Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! An empty file is a valid config: usage tracking on, stock endpoint,
//! `info` logging.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use bento_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[core]\nusage_tracking = false").unwrap();
//! assert!(!config.core.usage_tracking);
//! ```
//!
//! # Environment overrides
//!
//! Applied by [`Config::load`] after the file is read:
//!
//! | variable | effect |
//! |---|---|
//! | `BENTOML_DO_NOT_TRACK` | truthy value forces `core.usage_tracking = false` |
//! | `BENTOML_USAGE_TRACKING` | sets `core.usage_tracking` |
//! | `BENTOML_TELEMETRY_DEV_API_KEY` | sets `telemetry.dev_api_key` |
//! | `BENTOML_TELEMETRY_PROD_API_KEY` | sets `telemetry.prod_api_key` |

mod core_config;
mod error;
mod logging;
mod telemetry;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tracing::warn;

pub use core_config::CoreConfig;
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use telemetry::TelemetryConfig;

/// Forces tracking off when truthy. Beats every other setting.
pub const ENV_DO_NOT_TRACK: &str = "BENTOML_DO_NOT_TRACK";

/// Overrides `core.usage_tracking`.
pub const ENV_USAGE_TRACKING: &str = "BENTOML_USAGE_TRACKING";

/// Overrides `telemetry.dev_api_key`.
pub const ENV_DEV_API_KEY: &str = "BENTOML_TELEMETRY_DEV_API_KEY";

/// Overrides `telemetry.prod_api_key`.
pub const ENV_PROD_API_KEY: &str = "BENTOML_TELEMETRY_PROD_API_KEY";

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Framework-wide switches
    pub core: CoreConfig,

    /// Usage telemetry endpoint and credentials
    pub telemetry: TelemetryConfig,

    /// Logging configuration
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or contains invalid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Load configuration the way the CLI does.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present, otherwise defaults. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(default) if default.exists() => Self::from_file(default)?,
                _ => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment-style overrides from `lookup`.
    ///
    /// Unparsable boolean values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_USAGE_TRACKING) {
            match parse_bool(&raw) {
                Some(enabled) => self.core.usage_tracking = enabled,
                None => warn!(
                    variable = ENV_USAGE_TRACKING,
                    value = %raw,
                    "ignoring unparsable boolean override"
                ),
            }
        }

        if let Some(raw) = lookup(ENV_DO_NOT_TRACK)
            && parse_bool(&raw).unwrap_or(false)
        {
            self.core.usage_tracking = false;
        }

        if let Some(key) = lookup(ENV_DEV_API_KEY) {
            self.telemetry.dev_api_key = Some(key);
        }

        if let Some(key) = lookup(ENV_PROD_API_KEY) {
            self.telemetry.prod_api_key = Some(key);
        }
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if let Some(ref endpoint) = self.telemetry.endpoint
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ConfigError::invalid_value(
                "telemetry",
                "endpoint",
                format!("'{}' is not an http(s) URL", endpoint),
            ));
        }

        if let Some(timeout) = self.telemetry.timeout
            && timeout.is_zero()
        {
            return Err(ConfigError::invalid_value(
                "telemetry",
                "timeout",
                "must be greater than zero",
            ));
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Default path for the config file (`~/.bentoml/bentoml.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".bentoml").join("bentoml.toml"))
}

/// Parse a permissive boolean (`true/false`, `1/0`, `yes/no`, `on/off`).
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
