//! Telemetry configuration
//!
//! Where usage events go and which credentials authenticate them.
//!
//! The endpoint and timeout default to the values baked into the telemetry
//! crate, so most deployments never set them. API keys are never embedded in
//! source: supply them here or through `BENTOML_TELEMETRY_DEV_API_KEY` and
//! `BENTOML_TELEMETRY_PROD_API_KEY`. Without a key for the active release
//! channel, events are silently skipped.

use serde::Deserialize;
use std::time::Duration;

/// Telemetry configuration
///
/// # Example
///
/// ```toml
/// [telemetry]
/// endpoint = "https://api.amplitude.com/httpapi"
/// timeout = "1s"
/// dev_api_key = "..."
/// prod_api_key = "..."
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Override the analytics ingestion URL
    pub endpoint: Option<String>,

    /// Override the request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// API key used by development checkouts
    pub dev_api_key: Option<String>,

    /// API key used by official tagged releases
    pub prod_api_key: Option<String>,
}

impl TelemetryConfig {
    /// Select the API key for a release channel.
    ///
    /// Empty strings count as unset.
    pub fn api_key(&self, official_release: bool) -> Option<&str> {
        let key = if official_release {
            self.prod_api_key.as_deref()
        } else {
            self.dev_api_key.as_deref()
        };
        key.filter(|k| !k.is_empty())
    }
}
