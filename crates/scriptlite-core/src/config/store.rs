//! Persisted root configuration: a single `{"scriptRootDirectory": ...}` record.
//!
//! Read once at startup; `scriptlite config set-root` writes it. A running
//! server keeps the root it started with until it is restarted.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::env_keys::paths;
use super::loader::env_optional;

/// The persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootConfig {
    pub script_root_directory: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot locate home directory; set SCRIPTLITE_CONFIG_FILE")]
    NoHome,
}

/// File-backed store for [`RootConfig`].
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$SCRIPTLITE_CONFIG_FILE`, else `~/.scriptlite/config.json`.
    pub fn from_env() -> Result<Self, ConfigError> {
        super::loader::load_dotenv();
        if let Some(p) = env_optional(paths::SCRIPTLITE_CONFIG_FILE, &[]) {
            return Ok(Self::new(p));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
        Ok(Self::new(home.join(".scriptlite").join("config.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record. A missing file is `Ok(None)`, not an error.
    pub fn load(&self) -> Result<Option<RootConfig>, ConfigError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Persist the record (temp file + rename).
    pub fn save(&self, config: &RootConfig) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(write_err)?;

        let json = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        tracing::info!(path = %self.path.display(), root = %config.script_root_directory.display(), "Saved root configuration");
        Ok(())
    }
}
