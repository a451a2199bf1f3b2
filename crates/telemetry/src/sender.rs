//! Event sender - delivers one event per call, best effort.
//!
//! The event is wrapped in a single-element JSON array, paired with the API
//! key as a form body and POSTed once. Failures are logged at info level and
//! dropped: there is no retry, no queue and no error for the caller.

use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::endpoint::{Endpoint, FIELD_API_KEY, FIELD_EVENT};
use crate::error::TelemetryError;
use crate::payload::{AmplitudeEvent, EventProperties};
use crate::session::SessionId;
use crate::transport::{Delivery, Transport};

/// Shown in previews instead of the real key
const MASK: &str = "****";

/// Serializes and posts usage events.
#[derive(Clone)]
pub struct EventSender {
    transport: Arc<dyn Transport>,
    endpoint: Endpoint,
    session: SessionId,
    api_key: Option<String>,
}

impl EventSender {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoint: Endpoint,
        session: SessionId,
        api_key: Option<String>,
    ) -> Self {
        Self {
            transport,
            endpoint,
            session,
            api_key,
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Whether a credential is available to send with.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send one event (fire-and-forget).
    ///
    /// Returns the delivery on success and `None` on any failure or when no
    /// API key is configured.
    pub async fn send(&self, event_type: &str, properties: &EventProperties) -> Option<Delivery> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!(event_type, "No telemetry API key configured, event skipped");
            return None;
        };

        match self.try_send(api_key, event_type, properties).await {
            Ok(delivery) => {
                trace!(event_type, status = delivery.status, "Usage event sent");
                Some(delivery)
            }
            Err(e) => {
                info!(error = %e, event_type, "Failed to send usage event");
                None
            }
        }
    }

    /// Form fields exactly as [`send`](Self::send) would post them, with the
    /// API key masked.
    pub fn preview(
        &self,
        event_type: &str,
        properties: &EventProperties,
    ) -> Result<Vec<(&'static str, String)>, TelemetryError> {
        let event = self.encode_event(event_type, properties)?;
        let api_key = match self.api_key.as_deref() {
            Some(key) => mask_key(key),
            None => "<unset>".to_string(),
        };

        Ok(vec![(FIELD_API_KEY, api_key), (FIELD_EVENT, event)])
    }

    async fn try_send(
        &self,
        api_key: &str,
        event_type: &str,
        properties: &EventProperties,
    ) -> Result<Delivery, TelemetryError> {
        let event = self.encode_event(event_type, properties)?;
        let fields = [(FIELD_API_KEY, api_key), (FIELD_EVENT, event.as_str())];

        self.transport
            .post_form(&self.endpoint.url, &fields, self.endpoint.timeout)
            .await
    }

    /// JSON array holding the single event record.
    fn encode_event(
        &self,
        event_type: &str,
        properties: &EventProperties,
    ) -> Result<String, TelemetryError> {
        let event = AmplitudeEvent {
            event_type,
            user_id: self.session.as_str(),
            event_properties: properties,
        };

        Ok(serde_json::to_string(&[event])?)
    }
}

/// Keep a short prefix so operators can tell keys apart.
fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    if prefix.chars().count() < key.chars().count() {
        format!("{}{}", prefix, MASK)
    } else {
        MASK.to_string()
    }
}
