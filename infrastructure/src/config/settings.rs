//! Token settings file (`~/.openlink/settings.json`)
//!
//! The token is only read here. Issuing one is the job of whatever runs the
//! transport in front of the engine.

use super::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Settings {
    /// Default location: `~/.openlink/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".openlink").join("settings.json"))
    }

    /// Read the settings file. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ConfigError::Settings {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ConfigError::Settings {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Token from the default settings file, if one is set.
    pub fn load_token() -> Result<Option<String>, ConfigError> {
        let Some(path) = Self::default_path() else {
            return Ok(None);
        };
        Ok(Self::load(&path)?
            .map(|s| s.token)
            .filter(|t| !t.is_empty()))
    }
}
