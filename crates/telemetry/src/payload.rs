//! Telemetry payload types.
//!
//! Defines the exact structure of data sent to the analytics endpoint.
//! Properties are a flat JSON object; the record wrapping them follows the
//! Amplitude HTTP API event shape.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::service::ModelService;

/// Open property mapping attached to an event.
pub type EventProperties = Map<String, Value>;

/// Language runtime version key (name kept for dashboard compatibility)
pub const KEY_PY_VERSION: &str = "py_version";

/// Framework version key
pub const KEY_BENTO_VERSION: &str = "bento_version";

/// Platform description key
pub const KEY_PLATFORM_INFO: &str = "platform_info";

/// Deploy target key set by CLI events
pub const KEY_PLATFORM: &str = "platform";

/// One event record in the Amplitude HTTP API shape.
#[derive(Debug, Clone, Serialize)]
pub struct AmplitudeEvent<'a> {
    pub event_type: &'a str,
    pub user_id: &'a str,
    pub event_properties: &'a EventProperties,
}

/// Fields every event carries, collected once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    /// Version of the rustc that compiled this build
    pub language_version: String,

    /// Framework version
    pub bento_version: String,

    /// Operating system, architecture and family
    pub platform: String,
}

impl RuntimeInfo {
    /// Collect runtime info from the current build and environment
    pub fn collect() -> Self {
        Self {
            language_version: env!("BENTO_RUSTC_VERSION").to_string(),
            bento_version: env!("CARGO_PKG_VERSION").to_string(),
            platform: format!(
                "{}-{}-{}",
                std::env::consts::OS,
                std::env::consts::ARCH,
                std::env::consts::FAMILY
            ),
        }
    }

    /// Write the universal fields into `properties`, replacing any
    /// caller-supplied values under the same keys.
    pub fn inject(&self, properties: &mut EventProperties) {
        properties.insert(
            KEY_PY_VERSION.to_string(),
            Value::String(self.language_version.clone()),
        );
        properties.insert(
            KEY_BENTO_VERSION.to_string(),
            Value::String(self.bento_version.clone()),
        );
        properties.insert(
            KEY_PLATFORM_INFO.to_string(),
            Value::String(self.platform.clone()),
        );
    }
}

/// Snapshot of a model service for save/load events.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceInfo {
    pub artifact_types: Vec<&'static str>,
    pub handler_types: Vec<&'static str>,
    pub env: Map<String, Value>,
}

impl ServiceInfo {
    /// Convert into event properties.
    pub fn into_properties(self) -> EventProperties {
        let mut properties = EventProperties::new();
        properties.insert("artifact_types".into(), self.artifact_types.into());
        properties.insert("handler_types".into(), self.handler_types.into());
        properties.insert("env".into(), Value::Object(self.env));
        properties
    }
}

/// Describe a model service by the kinds of its artifacts and handlers.
pub fn service_info(service: &dyn ModelService) -> ServiceInfo {
    ServiceInfo {
        artifact_types: service
            .artifacts()
            .iter()
            .map(|artifact| artifact.kind.kind_name())
            .collect(),
        handler_types: service
            .apis()
            .iter()
            .map(|api| api.handler.kind_name())
            .collect(),
        env: service.env().to_properties(),
    }
}

/// Properties for a CLI event. `platform` is present only for a non-empty
/// deploy target.
pub fn cli_info(deploy_platform: Option<&str>) -> EventProperties {
    let mut properties = EventProperties::new();
    if let Some(platform) = deploy_platform.filter(|p| !p.is_empty()) {
        properties.insert(KEY_PLATFORM.to_string(), Value::String(platform.to_string()));
    }
    properties
}
