//! Command implementations for the Bento CLI

pub mod deploy;
pub mod service;
pub mod telemetry;
