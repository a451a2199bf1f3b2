//! Telemetry endpoint configuration.
//!
//! Static defaults for the analytics ingestion endpoint. Both can be
//! overridden in the `[telemetry]` config section.

use std::time::Duration;

/// Amplitude HTTP API ingestion URL
pub const AMPLITUDE_URL: &str = "https://api.amplitude.com/httpapi";

/// Request timeout. Telemetry must never hold up the caller for long.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Form field carrying the API key
pub const FIELD_API_KEY: &str = "api_key";

/// Form field carrying the JSON-encoded event array
pub const FIELD_EVENT: &str = "event";

/// Resolved endpoint settings for one tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Ingestion URL
    pub url: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            url: AMPLITUDE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Endpoint {
    /// Apply config overrides on top of the defaults.
    pub fn from_config(config: &bento_config::TelemetryConfig) -> Self {
        let defaults = Self::default();
        Self {
            url: config.endpoint.clone().unwrap_or(defaults.url),
            timeout: config.timeout.unwrap_or(defaults.timeout),
        }
    }
}
