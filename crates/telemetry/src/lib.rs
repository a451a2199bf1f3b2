//! Bento usage telemetry - anonymous, best-effort usage events.
//!
//! Records when model services are saved or loaded and which CLI commands
//! run. Key principles:
//!
//! - **Gated**: every call checks `[core] usage_tracking` first and does
//!   nothing when it is off
//! - **Anonymous**: the only identifier is a random per-process session id
//! - **Invisible**: failures are logged at info level and swallowed, callers
//!   never see an error
//! - **Bounded**: one POST per event, no retries, 1s timeout by default
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Tracker   │────▶│   Payload    │────▶│ EventSender  │
//! │ (gate check)│     │ (properties) │     │ (form POST)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//!       │                                         │
//!       │ Reads from:                             │ Sends to:
//!       │ - TrackingGate (config)                 │ - api.amplitude.com/httpapi
//!       │ - ModelService                          │
//!       │ - BuildInfo (release channel)           │
//!       ▼                                         ▼
//! ┌─────────────┐                         ┌──────────────┐
//! │   Caller    │                         │  Transport   │
//! │ (never errs)│                         │  (timeout)   │
//! └─────────────┘                         └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use bento_config::Config;
//! use bento_telemetry::Tracker;
//!
//! # async fn run() {
//! let config = Config::load(None).unwrap_or_default();
//! let tracker = Tracker::from_config(&config);
//!
//! // Never fails; returns the delivery when the POST succeeded
//! let _ = tracker.track_cli("deploy", Some("aws-lambda")).await;
//! # }
//! ```

pub mod endpoint;
pub mod error;
pub mod gate;
pub mod payload;
pub mod release;
pub mod sender;
pub mod service;
pub mod session;
pub mod tracker;
pub mod transport;

pub use endpoint::Endpoint;
pub use error::TelemetryError;
pub use gate::TrackingGate;
pub use payload::{EventProperties, RuntimeInfo, ServiceInfo, cli_info, service_info};
pub use release::BuildInfo;
pub use sender::EventSender;
pub use service::{
    ArtifactKind, CondaEnv, HandlerKind, ModelService, ServiceApi, ServiceArtifact, ServiceEnv,
};
pub use session::SessionId;
pub use tracker::{Tracker, TrackerBuilder};
pub use transport::{Delivery, HttpTransport, Transport};
