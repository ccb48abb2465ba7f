//! Script storage layout, records and catalog.
//!
//! On-disk convention (one directory per script):
//!
//! ```text
//! <root>/<stem>/<stem>.py        script source
//! <root>/<stem>/.scriptlite.json ScriptRecord (timestamps, python version)
//! <root>/<stem>/.scriptlite-env  EnvironmentMarker (written after provisioning)
//! <root>/<stem>/requirements.txt optional manifest (user-provided)
//! ```

pub mod catalog;
pub mod layout;
pub mod record;

pub use catalog::{ScriptCatalog, ScriptEntry};
pub use layout::{ScriptLayout, ScriptPaths};
pub use record::{EnvironmentMarker, ScriptRecord};

use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::outcome::OutcomeKind;

/// Canonical script suffix.
pub const SCRIPT_SUFFIX: &str = ".py";

/// Sidecar holding the [`ScriptRecord`].
pub const RECORD_FILE: &str = ".scriptlite.json";

/// Sentinel whose presence means the environment was already provisioned.
pub const ENV_MARKER: &str = ".scriptlite-env";

/// Optional dependency manifest.
pub const MANIFEST_FILE: &str = "requirements.txt";

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Invalid script name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Script '{0}' not found")]
    NotFound(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt record {path}: {source}")]
    Record {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ScriptError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The user-facing tag, when this error has one of its own.
    pub fn outcome_kind(&self) -> Option<OutcomeKind> {
        match self {
            Self::InvalidName { .. } => Some(OutcomeKind::InvalidName),
            Self::NotFound(_) => Some(OutcomeKind::NotFound),
            Self::Io { .. } | Self::Record { .. } => None,
        }
    }
}

/// Replace `path` with `contents` via a temp file in the same directory + rename.
///
/// Keeps the permissions of the file being replaced.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ScriptError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| ScriptError::io(dir, e))?;
    tmp.write_all(contents)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| ScriptError::io(tmp.path(), e))?;

    match std::fs::metadata(path) {
        Ok(meta) => {
            let _ = tmp.as_file().set_permissions(meta.permissions());
        }
        Err(_) => {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let _ = tmp
                    .as_file()
                    .set_permissions(std::fs::Permissions::from_mode(0o644));
            }
        }
    }

    tmp.persist(path).map_err(|e| ScriptError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces_content() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.py");
        write_atomic(&path, b"print(1)").unwrap();
        write_atomic(&path, b"print(2)").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "print(2)");
        // no temp files left behind
        let leftovers: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().flatten().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_outcome_kind_mapping() {
        let e = ScriptError::NotFound("x".into());
        assert_eq!(e.outcome_kind(), Some(OutcomeKind::NotFound));
        let e = ScriptError::io(Path::new("/x"), std::io::Error::other("boom"));
        assert_eq!(e.outcome_kind(), None);
    }
}
