//! Tracker - the public tracking entry points.
//!
//! A `Tracker` is built once at startup and holds everything that stays
//! fixed for the process: the session id, the API key chosen by release
//! channel, and runtime info. Every entry point asks the gate first; when
//! tracking is off nothing is built and nothing is sent.

use std::sync::Arc;

use tracing::trace;

use crate::endpoint::Endpoint;
use crate::error::TelemetryError;
use crate::gate::TrackingGate;
use crate::payload::{self, EventProperties, RuntimeInfo};
use crate::release::BuildInfo;
use crate::sender::EventSender;
use crate::service::ModelService;
use crate::session::SessionId;
use crate::transport::{Delivery, HttpTransport, Transport};

/// Event type for saving a model service
pub const EVENT_SAVE: &str = "save";

/// Event type for loading a model service
pub const EVENT_LOAD: &str = "load";

/// Prefix for CLI command events
pub const EVENT_CLI_PREFIX: &str = "cli-";

/// Process-wide telemetry context.
///
/// Cheap to clone.
#[derive(Clone)]
pub struct Tracker {
    gate: Arc<dyn TrackingGate>,
    build: BuildInfo,
    runtime: RuntimeInfo,
    sender: EventSender,
}

impl Tracker {
    /// Build the tracker from loaded configuration.
    ///
    /// The config doubles as the tracking gate.
    pub fn from_config(config: &bento_config::Config) -> Self {
        Self::from_config_for_build(config, BuildInfo::current())
    }

    /// Like [`from_config`](Self::from_config) for an explicit build; the
    /// build's release channel picks the API key.
    pub fn from_config_for_build(config: &bento_config::Config, build: BuildInfo) -> Self {
        let api_key = config
            .telemetry
            .api_key(build.is_official_release())
            .map(str::to_string);

        TrackerBuilder::new()
            .gate(config.clone())
            .endpoint(Endpoint::from_config(&config.telemetry))
            .build_info(build)
            .api_key(api_key)
            .build()
    }

    pub fn builder() -> TrackerBuilder {
        TrackerBuilder::new()
    }

    /// Whether the gate currently allows tracking.
    pub fn is_enabled(&self) -> bool {
        self.gate.usage_tracking_enabled()
    }

    pub fn session(&self) -> &SessionId {
        self.sender.session()
    }

    pub fn build_info(&self) -> &BuildInfo {
        &self.build
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.sender.endpoint()
    }

    /// Whether a credential exists for the active release channel.
    pub fn has_api_key(&self) -> bool {
        self.sender.has_api_key()
    }

    /// Add the universal fields to `properties` in place and send.
    ///
    /// Does not consult the gate; the typed trackers below do.
    pub async fn track(
        &self,
        event_type: &str,
        properties: &mut EventProperties,
    ) -> Option<Delivery> {
        self.runtime.inject(properties);
        self.sender.send(event_type, properties).await
    }

    /// Record that a model service was saved.
    pub async fn track_save(&self, service: &dyn ModelService) -> Option<Delivery> {
        self.track_service(EVENT_SAVE, service).await
    }

    /// Record that a model service was loaded.
    pub async fn track_load(&self, service: &dyn ModelService) -> Option<Delivery> {
        self.track_service(EVENT_LOAD, service).await
    }

    /// Record a CLI command, optionally with its deploy target.
    pub async fn track_cli(
        &self,
        command: &str,
        deploy_platform: Option<&str>,
    ) -> Option<Delivery> {
        if !self.is_enabled() {
            trace!(command, "Usage tracking disabled");
            return None;
        }

        let mut properties = payload::cli_info(deploy_platform);
        let event_type = format!("{}{}", EVENT_CLI_PREFIX, command);
        self.track(&event_type, &mut properties).await
    }

    /// Form fields `track` would send for this event, without sending.
    pub fn preview(
        &self,
        event_type: &str,
        properties: &EventProperties,
    ) -> Result<Vec<(&'static str, String)>, TelemetryError> {
        let mut properties = properties.clone();
        self.runtime.inject(&mut properties);
        self.sender.preview(event_type, &properties)
    }

    async fn track_service(
        &self,
        event_type: &str,
        service: &dyn ModelService,
    ) -> Option<Delivery> {
        if !self.is_enabled() {
            trace!(event_type, "Usage tracking disabled");
            return None;
        }

        let mut properties = payload::service_info(service).into_properties();
        self.track(event_type, &mut properties).await
    }
}

/// Builder for [`Tracker`].
///
/// Unset parts fall back to production defaults: tracking enabled, build
/// info of this binary, a fresh session id, the stock endpoint and the
/// reqwest transport.
#[derive(Default)]
pub struct TrackerBuilder {
    gate: Option<Arc<dyn TrackingGate>>,
    build: Option<BuildInfo>,
    runtime: Option<RuntimeInfo>,
    session: Option<SessionId>,
    endpoint: Option<Endpoint>,
    api_key: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl TrackerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gate(mut self, gate: impl TrackingGate + 'static) -> Self {
        self.gate = Some(Arc::new(gate));
        self
    }

    pub fn build_info(mut self, build: BuildInfo) -> Self {
        self.build = Some(build);
        self
    }

    pub fn runtime(mut self, runtime: RuntimeInfo) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn session(mut self, session: SessionId) -> Self {
        self.session = Some(session);
        self
    }

    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Credential to send with. Empty strings count as unset.
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Tracker {
        let build = self.build.unwrap_or_else(BuildInfo::current);
        let endpoint = self.endpoint.unwrap_or_default();
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new(endpoint.timeout)));

        let sender = EventSender::new(
            transport,
            endpoint,
            self.session.unwrap_or_else(SessionId::generate),
            self.api_key,
        );

        Tracker {
            gate: self.gate.unwrap_or_else(|| Arc::new(true)),
            build,
            runtime: self.runtime.unwrap_or_else(RuntimeInfo::collect),
            sender,
        }
    }
}
