//! Infrastructure layer for openlink
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the path sandbox and network guard, every built-in
//! tool, configuration loading, and dispatch auditing.

pub mod config;
pub mod instructions;
pub mod logging;
pub mod security;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, ConfigOverrides, ConfigSource, FileConfig, FileEngineConfig,
    FileInterceptorConfig, FileLoggingConfig, Settings,
};
pub use instructions::FileInstructionSource;
pub use logging::JsonlDispatchLogger;
pub use security::PathSandbox;
#[cfg(feature = "web-tools")]
pub use security::{HostResolver, NetworkGuard, SystemResolver};
pub use tools::builtin_registry;
