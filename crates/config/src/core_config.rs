//! Core configuration
//!
//! Framework-wide switches. Today this is only the usage tracking flag.

use serde::Deserialize;

/// Core configuration
///
/// # Example
///
/// ```toml
/// [core]
/// usage_tracking = false
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Send anonymous usage events
    /// Default: true
    pub usage_tracking: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            usage_tracking: true,
        }
    }
}
