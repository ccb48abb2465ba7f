//! Sidecar records stored next to each script.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{write_atomic, ScriptError, ENV_MARKER, RECORD_FILE};

/// Metadata for one stored script. `created_at` never changes after the first save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRecord {
    pub name: String,
    pub python_version: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl ScriptRecord {
    /// Record for a write happening at `now`.
    ///
    /// Keeps `previous.created_at`; `modified_at` always moves forward, by 1µs
    /// when the clock has not advanced since the last write.
    pub fn touched(
        previous: Option<&ScriptRecord>,
        name: &str,
        python_version: &str,
        now: DateTime<Utc>,
    ) -> Self {
        match previous {
            Some(prev) => {
                let modified_at = if now > prev.modified_at {
                    now
                } else {
                    prev.modified_at + Duration::microseconds(1)
                };
                Self {
                    name: name.to_string(),
                    python_version: python_version.to_string(),
                    created_at: prev.created_at,
                    modified_at,
                }
            }
            None => Self {
                name: name.to_string(),
                python_version: python_version.to_string(),
                created_at: now,
                modified_at: now,
            },
        }
    }

    pub fn load(dir: &Path) -> Result<Option<Self>, ScriptError> {
        read_json(&dir.join(RECORD_FILE))
    }

    pub fn store(&self, dir: &Path) -> Result<(), ScriptError> {
        write_json(&dir.join(RECORD_FILE), self)
    }
}

/// Contents of the environment sentinel. Only its presence is load-bearing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentMarker {
    pub python_version: String,
    pub provisioned_at: DateTime<Utc>,
}

impl EnvironmentMarker {
    pub fn exists(dir: &Path) -> bool {
        dir.join(ENV_MARKER).is_file()
    }

    pub fn load(dir: &Path) -> Result<Option<Self>, ScriptError> {
        read_json(&dir.join(ENV_MARKER))
    }

    pub fn store(&self, dir: &Path) -> Result<(), ScriptError> {
        write_json(&dir.join(ENV_MARKER), self)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, ScriptError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ScriptError::io(path, e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| ScriptError::Record {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ScriptError> {
    let json = serde_json::to_vec_pretty(value).map_err(|source| ScriptError::Record {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, &json)
}
