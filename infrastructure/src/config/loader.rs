//! Configuration file loader with multi-source merging

use super::ConfigError;
use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Environment variable prefix; nested keys use `__` (`OPENLINK_ENGINE__PORT`)
pub const ENV_PREFIX: &str = "OPENLINK_";

/// Project-level config file names, checked in order
const PROJECT_FILES: &[&str] = &["openlink.toml", ".openlink.toml"];

/// Command-line flags that override every file and environment source
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

/// One config file location and whether it exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub label: &'static str,
    pub path: PathBuf,
    pub found: bool,
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. Global: `$XDG_CONFIG_HOME/openlink/config.toml`
    /// 3. Project: `./openlink.toml` or `./.openlink.toml`
    /// 4. Explicit config path (if provided)
    /// 5. Environment: `OPENLINK_*`
    /// 6. Command-line flags
    pub fn load(
        config_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<FileConfig, ConfigError> {
        let figment = Self::figment(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            config_path,
            ENV_PREFIX,
        );
        Self::extract(figment, overrides)
    }

    /// Defaults plus command-line flags only (for --no-config)
    pub fn load_defaults(overrides: &ConfigOverrides) -> Result<FileConfig, ConfigError> {
        let figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));
        Self::extract(figment, overrides)
    }

    fn figment(
        global: Option<&Path>,
        project: Option<&Path>,
        explicit: Option<&Path>,
        env_prefix: &str,
    ) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(path) = global
            && path.exists()
        {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = project {
            figment = figment.merge(Toml::file(path));
        }
        // An explicit path that does not exist is an error, not a skip
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file_exact(path));
        }

        figment.merge(Env::prefixed(env_prefix).split("__"))
    }

    fn extract(figment: Figment, overrides: &ConfigOverrides) -> Result<FileConfig, ConfigError> {
        figment
            .merge(Serialized::default("engine", overrides))
            .extract()
            .map_err(|e| ConfigError::Extract(Box::new(e)))
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("openlink").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Config file locations in priority order, highest first
    pub fn sources(config_path: Option<&Path>) -> Vec<ConfigSource> {
        let mut sources = Vec::new();

        if let Some(path) = config_path {
            sources.push(ConfigSource {
                label: "Explicit",
                path: path.to_path_buf(),
                found: path.exists(),
            });
        }
        match Self::project_config_path() {
            Some(path) => sources.push(ConfigSource {
                label: "Project",
                path,
                found: true,
            }),
            None => sources.push(ConfigSource {
                label: "Project",
                path: PathBuf::from(PROJECT_FILES[0]),
                found: false,
            }),
        }
        if let Some(path) = Self::global_config_path() {
            let found = path.exists();
            sources.push(ConfigSource {
                label: "Global",
                path,
                found,
            });
        }
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const NO_ENV: &str = "OPENLINK_LOADER_TEST_UNSET_";

    fn extract(figment: Figment, overrides: &ConfigOverrides) -> FileConfig {
        ConfigLoader::extract(figment, overrides).unwrap()
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults(&ConfigOverrides::default()).unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_project_overrides_global() {
        let dir = tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("openlink.toml");
        std::fs::write(&global, "[engine]\nport = 1111\ntimeout_seconds = 9\n").unwrap();
        std::fs::write(&project, "[engine]\nport = 2222\n").unwrap();

        let config = extract(
            ConfigLoader::figment(Some(&global), Some(&project), None, NO_ENV),
            &ConfigOverrides::default(),
        );

        assert_eq!(config.engine.port, 2222);
        assert_eq!(config.engine.timeout_seconds, 9);
    }

    #[test]
    fn test_missing_global_is_skipped() {
        let dir = tempdir().unwrap();
        let config = extract(
            ConfigLoader::figment(Some(&dir.path().join("absent.toml")), None, None, NO_ENV),
            &ConfigOverrides::default(),
        );
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempdir().unwrap();
        let figment =
            ConfigLoader::figment(None, None, Some(&dir.path().join("absent.toml")), NO_ENV);
        assert!(ConfigLoader::extract(figment, &ConfigOverrides::default()).is_err());
    }

    #[test]
    fn test_cli_flags_win() {
        let dir = tempdir().unwrap();
        let explicit = dir.path().join("custom.toml");
        std::fs::write(&explicit, "[engine]\nport = 3333\ntimeout_seconds = 10\n").unwrap();

        let overrides = ConfigOverrides {
            root_dir: Some(dir.path().to_path_buf()),
            port: Some(4444),
            timeout_seconds: None,
        };
        let config = extract(
            ConfigLoader::figment(None, None, Some(&explicit), NO_ENV),
            &overrides,
        );

        assert_eq!(config.engine.port, 4444);
        assert_eq!(config.engine.timeout_seconds, 10);
        assert_eq!(config.engine.root_dir, Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_environment_overrides_files() {
        let dir = tempdir().unwrap();
        let explicit = dir.path().join("custom.toml");
        std::fs::write(&explicit, "[engine]\nport = 3333\n").unwrap();

        let prefix = "OPENLINK_LOADER_TEST_ENV_";
        // SAFETY: the variable name is unique to this test.
        unsafe {
            std::env::set_var("OPENLINK_LOADER_TEST_ENV_ENGINE__PORT", "5555");
        }
        let config = extract(
            ConfigLoader::figment(None, None, Some(&explicit), prefix),
            &ConfigOverrides::default(),
        );
        unsafe {
            std::env::remove_var("OPENLINK_LOADER_TEST_ENV_ENGINE__PORT");
        }

        assert_eq!(config.engine.port, 5555);
    }

    #[test]
    fn test_sources_lists_explicit_first() {
        let dir = tempdir().unwrap();
        let explicit = dir.path().join("custom.toml");

        let sources = ConfigLoader::sources(Some(&explicit));
        assert_eq!(sources[0].label, "Explicit");
        assert!(!sources[0].found);
    }

    #[test]
    fn test_global_config_path_names_openlink() {
        if let Some(path) = ConfigLoader::global_config_path() {
            assert!(path.to_string_lossy().contains("openlink"));
        }
    }
}
