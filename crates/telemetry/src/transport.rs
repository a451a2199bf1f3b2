//! Outbound transport.
//!
//! One form-encoded POST per event. The trait is the seam tests use to
//! observe or fail deliveries without a network.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::TelemetryError;

/// Outcome of a successful POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// HTTP status returned by the endpoint (always 2xx)
    pub status: u16,
}

/// Sends a form-encoded body to a URL.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `fields` to `url`, giving up after `timeout`.
    ///
    /// Non-2xx responses are errors.
    async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Delivery, TelemetryError>;
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport whose connect phase is also bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .unwrap_or_default();

        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Delivery, TelemetryError> {
        let response = self
            .client
            .post(url)
            .form(fields)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(Delivery {
                status: status.as_u16(),
            })
        } else {
            Err(TelemetryError::Server(status.as_u16()))
        }
    }
}
