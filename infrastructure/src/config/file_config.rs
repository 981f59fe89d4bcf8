//! Raw TOML configuration data types
//!
//! These structs mirror the config file layout. They are merged by
//! [`ConfigLoader`](super::ConfigLoader) and only then converted into the
//! validated, immutable [`EngineConfig`] and [`InterceptorConfig`].

use super::ConfigError;
use openlink_application::config::InterceptorConfig;
use openlink_application::config::interceptor_config::{DEFAULT_REINJECT_EVERY, DEFAULT_REMINDER};
use openlink_domain::config::{DEFAULT_PORT, DEFAULT_TIMEOUT_SECS, EngineConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default prompt file, relative to the sandbox root
pub const DEFAULT_PROMPT_FILE: &str = "init_prompt.txt";

/// Home-relative directories readable through absolute paths by default
const DEFAULT_READ_ROOTS: &[&str] = &[".claude", ".openlink", ".agent"];

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub engine: FileEngineConfig,
    pub interceptor: FileInterceptorConfig,
    pub logging: FileLoggingConfig,
}

/// `[engine]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Sandbox root; the working directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<PathBuf>,
    pub port: u16,
    pub timeout_seconds: u64,
    /// Overrides the token from `~/.openlink/settings.json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Secondary read roots; `~/.claude`, `~/.openlink` and `~/.agent` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_read_roots: Option<Vec<PathBuf>>,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            root_dir: None,
            port: DEFAULT_PORT,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            token: None,
            extra_read_roots: None,
        }
    }
}

/// `[interceptor]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileInterceptorConfig {
    pub enabled: bool,
    pub reinject_every: u64,
    /// Instruction file re-injected periodically, relative to the root
    pub prompt_file: String,
    pub reminder: String,
}

impl Default for FileInterceptorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reinject_every: DEFAULT_REINJECT_EVERY,
            prompt_file: DEFAULT_PROMPT_FILE.to_string(),
            reminder: DEFAULT_REMINDER.to_string(),
        }
    }
}

impl FileInterceptorConfig {
    pub fn to_interceptor_config(&self) -> Result<InterceptorConfig, ConfigError> {
        if self.reinject_every == 0 {
            return Err(ConfigError::InvalidReinjectInterval);
        }
        Ok(InterceptorConfig::default()
            .with_enabled(self.enabled)
            .with_reinject_every(self.reinject_every)
            .with_reminder(self.reminder.clone()))
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL dispatch audit log; disabled when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_log: Option<PathBuf>,
}

impl FileEngineConfig {
    /// Validate and build the engine configuration.
    ///
    /// `settings_token` is used only when `token` is not configured here.
    pub fn to_engine_config(
        &self,
        settings_token: Option<String>,
    ) -> Result<EngineConfig, ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        let root = match &self.root_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(|e| ConfigError::InvalidRootDir {
                path: PathBuf::from("."),
                reason: e.to_string(),
            })?,
        };
        let root = canonical_root(&root)?;

        let extra_read_roots = match &self.extra_read_roots {
            Some(roots) => roots.iter().map(|r| expand_home(r)).collect(),
            None => default_read_roots(),
        };
        let token = self.token.clone().or(settings_token).unwrap_or_default();

        Ok(EngineConfig::new(root)
            .with_port(self.port)
            .with_timeout(Duration::from_secs(self.timeout_seconds))
            .with_token(token)
            .with_extra_read_roots(extra_read_roots))
    }
}

fn canonical_root(path: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = expand_home(path);
    let canonical = expanded
        .canonicalize()
        .map_err(|e| ConfigError::InvalidRootDir {
            path: expanded.clone(),
            reason: e.to_string(),
        })?;
    if !canonical.is_dir() {
        return Err(ConfigError::InvalidRootDir {
            path: canonical,
            reason: "not a directory".to_string(),
        });
    }
    Ok(canonical)
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

fn default_read_roots() -> Vec<PathBuf> {
    dirs::home_dir()
        .map(|home| DEFAULT_READ_ROOTS.iter().map(|d| home.join(d)).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = FileConfig::default();
        assert_eq!(config.engine.port, 39527);
        assert_eq!(config.engine.timeout_seconds, 60);
        assert!(config.interceptor.enabled);
        assert_eq!(config.interceptor.reinject_every, 20);
        assert_eq!(config.interceptor.prompt_file, "init_prompt.txt");
        assert!(config.logging.audit_log.is_none());
    }

    #[test]
    fn test_parse_sections() {
        let toml_str = r#"
[engine]
root_dir = "/srv/work"
port = 8080
timeout_seconds = 5
extra_read_roots = ["/opt/skills"]

[interceptor]
enabled = false
reinject_every = 3

[logging]
audit_log = "/tmp/openlink.jsonl"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.engine.root_dir, Some(PathBuf::from("/srv/work")));
        assert_eq!(config.engine.port, 8080);
        assert_eq!(config.engine.timeout_seconds, 5);
        assert!(!config.interceptor.enabled);
        assert_eq!(config.interceptor.reinject_every, 3);
        // Unset keys keep their defaults
        assert_eq!(config.interceptor.prompt_file, DEFAULT_PROMPT_FILE);
        assert_eq!(
            config.logging.audit_log,
            Some(PathBuf::from("/tmp/openlink.jsonl"))
        );
    }

    #[test]
    fn test_engine_config_canonicalizes_root() {
        let dir = tempdir().unwrap();
        let file = FileEngineConfig {
            root_dir: Some(dir.path().join(".")),
            timeout_seconds: 7,
            extra_read_roots: Some(vec![]),
            ..Default::default()
        };

        let config = file.to_engine_config(None).unwrap();
        assert_eq!(config.root_dir(), dir.path().canonicalize().unwrap());
        assert_eq!(config.timeout(), Duration::from_secs(7));
        assert!(config.extra_read_roots().is_empty());
    }

    #[test]
    fn test_engine_config_rejects_bad_root() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("plain.txt");
        std::fs::write(&file_path, "").unwrap();

        let missing = FileEngineConfig {
            root_dir: Some(dir.path().join("missing")),
            ..Default::default()
        };
        assert!(matches!(
            missing.to_engine_config(None),
            Err(ConfigError::InvalidRootDir { .. })
        ));

        let not_dir = FileEngineConfig {
            root_dir: Some(file_path),
            ..Default::default()
        };
        assert!(matches!(
            not_dir.to_engine_config(None),
            Err(ConfigError::InvalidRootDir { .. })
        ));
    }

    #[test]
    fn test_engine_config_rejects_zero_timeout() {
        let file = FileEngineConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        assert!(matches!(
            file.to_engine_config(None),
            Err(ConfigError::InvalidTimeout)
        ));
    }

    #[test]
    fn test_configured_token_wins_over_settings() {
        let dir = tempdir().unwrap();
        let mut file = FileEngineConfig {
            root_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        let config = file.to_engine_config(Some("from-settings".into())).unwrap();
        assert_eq!(config.token(), "from-settings");

        file.token = Some("from-config".into());
        let config = file.to_engine_config(Some("from-settings".into())).unwrap();
        assert_eq!(config.token(), "from-config");
    }

    #[test]
    fn test_interceptor_rejects_zero_interval() {
        let file = FileInterceptorConfig {
            reinject_every: 0,
            ..Default::default()
        };
        assert!(file.to_interceptor_config().is_err());

        let config = FileInterceptorConfig::default().to_interceptor_config().unwrap();
        assert_eq!(config.reinject_every, 20);
    }
}
