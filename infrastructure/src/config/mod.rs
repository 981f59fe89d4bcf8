//! Configuration loading for openlink
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Command-line flags (`--dir`, `--port`, `--timeout`)
//! 2. Environment: `OPENLINK_ENGINE__PORT`, ...
//! 3. `--config <path>` specified file
//! 4. Project root: `./openlink.toml` or `./.openlink.toml`
//! 5. Global: `$XDG_CONFIG_HOME/openlink/config.toml`
//! 6. Default values
//!
//! The bearer token is additionally read from `~/.openlink/settings.json`.

mod file_config;
mod loader;
mod settings;

pub use file_config::{
    DEFAULT_PROMPT_FILE, FileConfig, FileEngineConfig, FileInterceptorConfig, FileLoggingConfig,
};
pub use loader::{ConfigLoader, ConfigOverrides, ConfigSource, ENV_PREFIX};
pub use settings::Settings;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors; all of them are fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Extract(Box<figment::Error>),

    #[error("root directory {} is not usable: {reason}", path.display())]
    InvalidRootDir { path: PathBuf, reason: String },

    #[error("engine.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("interceptor.reinject_every cannot be 0")]
    InvalidReinjectInterval,

    #[error("failed to read settings file {}: {reason}", path.display())]
    Settings { path: PathBuf, reason: String },
}
