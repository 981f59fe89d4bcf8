//! Configuration value objects for the domain layer
//!
//! These are domain concepts related to configuration that are
//! used across multiple layers.

mod engine_config;

pub use engine_config::{DEFAULT_PORT, DEFAULT_TIMEOUT_SECS, EngineConfig};
