//! Session identity.
//!
//! A random id generated once per process. It is the `user_id` of every
//! event and is never written to disk, so two runs can't be linked.

use std::fmt;

use uuid::Uuid;

/// Process-lifetime anonymous identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random (UUIDv4) session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Use a fixed id (tests, reproducible previews).
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
