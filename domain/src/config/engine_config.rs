//! Engine configuration: immutable for the process lifetime.
//!
//! Built once at startup and shared read-only (`Arc<EngineConfig>`) by the
//! dispatcher and every tool.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default listening port of the transport layer
pub const DEFAULT_PORT: u16 = 39527;

/// Default per-dispatch timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, PartialEq, Eq)]
pub struct EngineConfig {
    root_dir: PathBuf,
    port: u16,
    timeout: Duration,
    token: String,
    extra_read_roots: Vec<PathBuf>,
}

impl EngineConfig {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            port: DEFAULT_PORT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token: String::new(),
            extra_read_roots: Vec::new(),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Secondary roots usable only for explicit absolute-path reads
    pub fn with_extra_read_roots(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        self.extra_read_roots = roots.into_iter().collect();
        self
    }

    // ==================== Accessors ====================

    /// The primary sandbox root
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn extra_read_roots(&self) -> &[PathBuf] {
        &self.extra_read_roots
    }

    /// Primary root followed by the secondary read roots
    pub fn read_roots(&self) -> Vec<PathBuf> {
        std::iter::once(self.root_dir.clone())
            .chain(self.extra_read_roots.iter().cloned())
            .collect()
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("EngineConfig")
            .field("root_dir", &self.root_dir)
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .field("token", &token)
            .field("extra_read_roots", &self.extra_read_roots)
            .finish()
    }
}
