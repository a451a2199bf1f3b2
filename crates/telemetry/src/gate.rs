//! Tracking gate.
//!
//! Asked on every tracking call, before any payload is built.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Answers "is usage tracking enabled right now".
pub trait TrackingGate: Send + Sync {
    fn usage_tracking_enabled(&self) -> bool;
}

impl TrackingGate for bool {
    fn usage_tracking_enabled(&self) -> bool {
        *self
    }
}

/// Runtime toggle, e.g. flipped by an opt-out prompt.
impl TrackingGate for Arc<AtomicBool> {
    fn usage_tracking_enabled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Reads `[core] usage_tracking`.
impl TrackingGate for bento_config::Config {
    fn usage_tracking_enabled(&self) -> bool {
        self.core.usage_tracking
    }
}
