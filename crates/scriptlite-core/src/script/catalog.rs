//! Browse stored scripts: list with timestamps, read content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{EnvironmentMarker, ScriptError, ScriptLayout, ScriptPaths, ScriptRecord};

/// One row of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEntry {
    pub name: String,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// From the record; `None` for scripts placed on disk by hand.
    pub python_version: Option<String>,
    pub environment_ready: bool,
}

/// Read-only view over the script root.
#[derive(Debug, Clone)]
pub struct ScriptCatalog {
    layout: ScriptLayout,
}

impl ScriptCatalog {
    pub fn new(layout: ScriptLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ScriptLayout {
        &self.layout
    }

    /// All scripts under the root, sorted by name.
    ///
    /// Only directories `d` holding `d/d.py` count; anything else is skipped
    /// silently. A missing root is an empty listing.
    pub fn list(&self) -> Result<Vec<ScriptEntry>, ScriptError> {
        let root = self.layout.root();
        let entries = match fs::read_dir(root) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ScriptError::io(root, e)),
        };

        let mut entries: Vec<_> = entries.flatten().collect();
        entries.sort_by_key(|e| e.file_name());

        let mut scripts = Vec::new();
        for entry in entries {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let dir_name = entry.file_name().to_string_lossy().to_string();
            let Ok(paths) = self.layout.resolve(&dir_name) else {
                continue;
            };
            // "foo.py/" resolves to "foo/"; only the exact convention counts.
            if paths.dir != path || !paths.file.is_file() {
                continue;
            }
            match self.entry_for(&paths) {
                Ok(e) => scripts.push(e),
                Err(e) => tracing::warn!(script = %paths.stem, "Skipping unreadable script: {}", e),
            }
        }
        Ok(scripts)
    }

    /// Raw content of `name`. Never creates anything on disk.
    pub fn read(&self, name: &str) -> Result<String, ScriptError> {
        let paths = self.layout.resolve(name)?;
        if !paths.file.is_file() {
            return Err(ScriptError::NotFound(paths.stem));
        }
        fs::read_to_string(&paths.file).map_err(|e| ScriptError::io(&paths.file, e))
    }

    /// Listing row for a single script.
    pub fn record(&self, name: &str) -> Result<ScriptEntry, ScriptError> {
        let paths = self.layout.resolve(name)?;
        if !paths.file.is_file() {
            return Err(ScriptError::NotFound(paths.stem));
        }
        self.entry_for(&paths)
    }

    fn entry_for(&self, paths: &ScriptPaths) -> Result<ScriptEntry, ScriptError> {
        let record = match ScriptRecord::load(&paths.dir) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(script = %paths.stem, "Ignoring corrupt record: {}", e);
                None
            }
        };
        let (created_at, modified_at, python_version) = match record {
            Some(r) => (r.created_at, r.modified_at, Some(r.python_version)),
            None => {
                let (created, modified) = fs_times(&paths.file)?;
                (created, modified, None)
            }
        };
        Ok(ScriptEntry {
            name: paths.stem.clone(),
            file_name: paths.file_name.clone(),
            created_at,
            modified_at,
            python_version,
            environment_ready: EnvironmentMarker::exists(&paths.dir),
        })
    }
}

/// Filesystem timestamps; birth time falls back to mtime and is clamped to it.
fn fs_times(file: &Path) -> Result<(DateTime<Utc>, DateTime<Utc>), ScriptError> {
    let meta = fs::metadata(file).map_err(|e| ScriptError::io(file, e))?;
    let modified: DateTime<Utc> = meta
        .modified()
        .map_err(|e| ScriptError::io(file, e))?
        .into();
    let created: DateTime<Utc> = meta.created().map(Into::into).unwrap_or(modified);
    Ok((created.min(modified), modified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn put_script(root: &Path, stem: &str, content: &str) {
        let dir = root.join(stem);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.py", stem)), content).unwrap();
    }

    #[test]
    fn test_missing_root_lists_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = ScriptCatalog::new(ScriptLayout::new(tmp.path().join("absent")));
        assert!(catalog.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_filters_to_convention_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        put_script(tmp.path(), "beta", "b");
        put_script(tmp.path(), "alpha", "a");
        // wrong file name inside dir
        fs::create_dir_all(tmp.path().join("gamma")).unwrap();
        fs::write(tmp.path().join("gamma").join("main.py"), "x").unwrap();
        // stray file at the root
        fs::write(tmp.path().join("loose.py"), "x").unwrap();
        // directory carrying the suffix in its name
        fs::create_dir_all(tmp.path().join("delta.py")).unwrap();
        fs::write(tmp.path().join("delta.py").join("delta.py.py"), "x").unwrap();

        let catalog = ScriptCatalog::new(ScriptLayout::new(tmp.path()));
        let names: Vec<_> = catalog.list().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_entry_prefers_record_timestamps() {
        let tmp = tempfile::tempdir().unwrap();
        put_script(tmp.path(), "alpha", "a");
        let t0 = Utc::now() - Duration::days(3);
        let rec = ScriptRecord::touched(None, "alpha", "3.10", t0);
        rec.store(&tmp.path().join("alpha")).unwrap();

        let catalog = ScriptCatalog::new(ScriptLayout::new(tmp.path()));
        let e = catalog.record("alpha").unwrap();
        assert_eq!(e.created_at, t0);
        assert_eq!(e.python_version.as_deref(), Some("3.10"));
        assert!(!e.environment_ready);
    }

    #[test]
    fn test_entry_without_record_uses_fs_times() {
        let tmp = tempfile::tempdir().unwrap();
        put_script(tmp.path(), "manual", "x");
        let catalog = ScriptCatalog::new(ScriptLayout::new(tmp.path()));
        let e = catalog.record("manual.py").unwrap();
        assert!(e.created_at <= e.modified_at);
        assert!(e.python_version.is_none());
    }

    #[test]
    fn test_read_missing_is_not_found_and_creates_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = ScriptCatalog::new(ScriptLayout::new(tmp.path()));
        let err = catalog.read("missing").unwrap_err();
        assert!(matches!(err, ScriptError::NotFound(ref n) if n == "missing"));
        assert!(!tmp.path().join("missing").exists());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_read_rejects_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = ScriptCatalog::new(ScriptLayout::new(tmp.path()));
        assert!(matches!(
            catalog.read("../secret").unwrap_err(),
            ScriptError::InvalidName { .. }
        ));
    }

    #[test]
    fn test_read_returns_content() {
        let tmp = tempfile::tempdir().unwrap();
        put_script(tmp.path(), "demo", "print(1)");
        let catalog = ScriptCatalog::new(ScriptLayout::new(tmp.path()));
        assert_eq!(catalog.read("demo").unwrap(), "print(1)");
        assert_eq!(catalog.read("demo.py").unwrap(), "print(1)");
    }
}
