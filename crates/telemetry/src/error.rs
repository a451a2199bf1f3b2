//! Telemetry error types.
//!
//! Every variant is a delivery failure. None of them ever reach callers of
//! the tracker API; they exist so the sender can log what went wrong.

use thiserror::Error;

/// Errors that can occur while delivering a usage event.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Network error during submission (connect, DNS, TLS, body)
    #[error("network error: {0}")]
    Network(String),

    /// Request did not complete within the timeout
    #[error("request timed out")]
    Timeout,

    /// Server returned a non-success status
    #[error("server error: HTTP {0}")]
    Server(u16),

    /// Event could not be serialized
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TelemetryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for TelemetryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Server(status.as_u16())
        } else {
            Self::Network(err.to_string())
        }
    }
}
