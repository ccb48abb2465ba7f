//! Script lifecycle: write the script, provision its environment once,
//! install its manifest, keep the record current.
//!
//! [`ScriptStore::save`] is the one entry point shared by the CLI and the
//! HTTP gateway. Saves of the same script are serialized by a per-directory
//! lock; saves of different scripts run in parallel.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use scriptlite_core::observability;
use scriptlite_core::outcome::{Outcome, OutcomeKind};
use scriptlite_core::script::{
    write_atomic, EnvironmentMarker, ScriptError, ScriptLayout, ScriptPaths, ScriptRecord,
};
use scriptlite_env::{
    DependencyInstaller, DependencyTool, EnvironmentProvisioner, EnvironmentTool, ProvisionError,
};
use serde::Serialize;
use thiserror::Error;

/// A request to store a script.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    /// Raw name as given by the caller; `.py` is appended if missing.
    pub name: String,
    pub content: String,
    /// Already normalized (`3.11`, `3.12.1`).
    pub python_version: String,
    pub overwrite: bool,
}

/// Details of a completed write.
#[derive(Debug, Clone, Serialize)]
pub struct SavedScript {
    pub name: String,
    pub file_name: String,
    /// The environment was created by this save.
    pub provisioned: bool,
    /// A manifest was present and an install was attempted.
    pub install_attempted: bool,
    /// Tool text of a failed install; the script itself is saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_warning: Option<String>,
    pub record: ScriptRecord,
}

#[derive(Debug, Clone)]
pub enum SaveOutcome {
    Saved(SavedScript),
    /// The script exists and overwrite was not requested. Nothing was written.
    Conflict { file_name: String },
}

impl SaveOutcome {
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Conflict { file_name } => Outcome::new(
                OutcomeKind::Conflict,
                format!(
                    "Script '{}' already exists. Save again with overwrite to replace it.",
                    file_name
                ),
            ),
            Self::Saved(s) => match &s.install_warning {
                Some(details) => Outcome::new(
                    OutcomeKind::InstallWarning,
                    format!("⚠️ Saved, but failed to update dependencies: {}", details),
                ),
                None => {
                    let env = if s.provisioned {
                        "Environment created"
                    } else {
                        "Environment already present"
                    };
                    Outcome::new(
                        OutcomeKind::Success,
                        format!("✅ Script saved. {} for {}", env, s.file_name),
                    )
                }
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    /// Bad name or a storage failure.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// The content was written but no environment could be provisioned.
    #[error("❌ Environment setup failed: {details}")]
    ProvisionFailed { file_name: String, details: String },
}

impl SaveError {
    /// The user-facing tag, or `None` for internal failures.
    pub fn outcome_kind(&self) -> Option<OutcomeKind> {
        match self {
            Self::Script(e) => e.outcome_kind(),
            Self::ProvisionFailed { .. } => Some(OutcomeKind::ProvisionFailed),
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome_kind()
            .map(|kind| Outcome::new(kind, self.to_string()))
    }
}

/// One lock per script directory, created on first use and dropped once
/// no save holds it, so the map only covers saves in flight.
#[derive(Default)]
struct DirLocks {
    inner: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl DirLocks {
    fn lock_for(&self, dir: &Path) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(dir.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Give back a handle from [`lock_for`](Self::lock_for). The entry is
    /// removed when the map and `handle` are its only owners; handles are
    /// only cloned under the map lock, so no waiter can be left on a
    /// detached mutex.
    fn release(&self, dir: &Path, handle: Arc<Mutex<()>>) {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if Arc::strong_count(&handle) == 2 {
            map.remove(dir);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

pub struct ScriptStore {
    layout: ScriptLayout,
    provisioner: EnvironmentProvisioner,
    installer: DependencyInstaller,
    locks: DirLocks,
}

impl ScriptStore {
    pub fn new(
        layout: ScriptLayout,
        env_tool: Arc<dyn EnvironmentTool>,
        dep_tool: Arc<dyn DependencyTool>,
    ) -> Self {
        Self {
            layout,
            provisioner: EnvironmentProvisioner::new(env_tool),
            installer: DependencyInstaller::new(dep_tool),
            locks: DirLocks::default(),
        }
    }

    pub fn layout(&self) -> &ScriptLayout {
        &self.layout
    }

    /// Store a script and make sure its environment exists.
    ///
    /// The content write happens before provisioning and is kept even when
    /// provisioning fails. A dependency install failure is reported as a
    /// warning on an otherwise successful save.
    pub fn save(&self, req: &SaveRequest) -> Result<SaveOutcome, SaveError> {
        let paths = self.layout.resolve(&req.name)?;
        let dir = paths.dir.clone();
        let lock = self.locks.lock_for(&dir);
        let result = {
            let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
            self.save_locked(paths, req)
        };
        self.locks.release(&dir, lock);
        result
    }

    fn save_locked(&self, paths: ScriptPaths, req: &SaveRequest) -> Result<SaveOutcome, SaveError> {
        std::fs::create_dir_all(&paths.dir).map_err(|e| ScriptError::Io {
            path: paths.dir.clone(),
            source: e,
        })?;

        let existed = paths.file.exists();
        if existed && !req.overwrite {
            tracing::info!(script = %paths.file_name, "Save refused: script exists");
            return Ok(SaveOutcome::Conflict {
                file_name: paths.file_name,
            });
        }

        write_atomic(&paths.file, req.content.as_bytes())?;
        let record = self.update_record(&paths, &req.python_version)?;
        tracing::info!(script = %paths.file_name, overwrite = existed, "Script written");

        let provisioned = match self.provisioner.ensure(&paths, &req.python_version) {
            Ok(r) => r.created,
            Err(ProvisionError { details }) => {
                tracing::error!(script = %paths.file_name, "{}", details);
                observability::audit_script_saved(&paths.file_name, existed, false, false);
                return Err(SaveError::ProvisionFailed {
                    file_name: paths.file_name,
                    details,
                });
            }
        };
        if provisioned {
            reassert_content(&paths, &req.content)?;
        }

        let (install_attempted, install_warning) =
            match self.installer.install_if_present(&paths.dir) {
                Ok(r) => (r.attempted, None),
                Err(e) => (true, Some(e.details)),
            };

        observability::audit_script_saved(
            &paths.file_name,
            existed,
            provisioned,
            install_warning.is_some(),
        );
        Ok(SaveOutcome::Saved(SavedScript {
            name: paths.stem,
            file_name: paths.file_name,
            provisioned,
            install_attempted,
            install_warning,
            record,
        }))
    }

    fn update_record(
        &self,
        paths: &ScriptPaths,
        requested_version: &str,
    ) -> Result<ScriptRecord, SaveError> {
        let previous = match ScriptRecord::load(&paths.dir) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(script = %paths.file_name, "Replacing unreadable record: {}", e);
                None
            }
        };
        // An existing environment keeps its interpreter; record what is really there.
        let python_version = match EnvironmentMarker::load(&paths.dir) {
            Ok(Some(marker)) => marker.python_version,
            _ => requested_version.to_string(),
        };
        let record = ScriptRecord::touched(
            previous.as_ref(),
            &paths.stem,
            &python_version,
            Utc::now(),
        );
        record.store(&paths.dir)?;
        Ok(record)
    }
}

/// The environment tool may have scaffolded files; the submitted content wins.
fn reassert_content(paths: &ScriptPaths, content: &str) -> Result<(), SaveError> {
    let on_disk = std::fs::read_to_string(&paths.file).ok();
    if on_disk.as_deref() != Some(content) {
        tracing::warn!(script = %paths.file_name, "Script changed during provisioning; restoring");
        write_atomic(&paths.file, content.as_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeEnvTool, FakePipTool};
    use scriptlite_core::script::{ScriptCatalog, ENV_MARKER, MANIFEST_FILE, RECORD_FILE};
    use std::sync::atomic::Ordering;

    fn request(name: &str, content: &str, overwrite: bool) -> SaveRequest {
        SaveRequest {
            name: name.to_string(),
            content: content.to_string(),
            python_version: "3.11".to_string(),
            overwrite,
        }
    }

    fn store_with(root: &Path, env: Arc<FakeEnvTool>, pip: Arc<FakePipTool>) -> ScriptStore {
        ScriptStore::new(ScriptLayout::new(root), env, pip)
    }

    fn saved(outcome: SaveOutcome) -> SavedScript {
        match outcome {
            SaveOutcome::Saved(s) => s,
            SaveOutcome::Conflict { file_name } => panic!("unexpected conflict for {}", file_name),
        }
    }

    #[test]
    fn test_demo_scenario() {
        let tmp = tempfile::tempdir().unwrap();
        let env = FakeEnvTool::scaffolding("main.py");
        let pip = FakePipTool::ok();
        let store = store_with(tmp.path(), env.clone(), pip.clone());

        let first = saved(store.save(&request("demo", "print(1)", false)).unwrap());
        assert!(first.provisioned);
        assert_eq!(first.file_name, "demo.py");
        assert_eq!(first.outcome_kind(), OutcomeKind::Success);
        let dir = tmp.path().join("demo");
        assert_eq!(std::fs::read_to_string(dir.join("demo.py")).unwrap(), "print(1)");
        assert!(!dir.join("main.py").exists());
        assert!(dir.join(ENV_MARKER).exists());

        let again = store.save(&request("demo", "print(2)", false)).unwrap();
        assert!(matches!(again, SaveOutcome::Conflict { .. }));
        assert_eq!(again.outcome().status, OutcomeKind::Conflict);
        assert_eq!(std::fs::read_to_string(dir.join("demo.py")).unwrap(), "print(1)");

        let third = saved(store.save(&request("demo", "print(2)", true)).unwrap());
        assert!(!third.provisioned);
        assert_eq!(std::fs::read_to_string(dir.join("demo.py")).unwrap(), "print(2)");
        assert_eq!(env.calls.load(Ordering::SeqCst), 1);
        assert_eq!(pip.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_name_normalization_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_with(tmp.path(), FakeEnvTool::ok(), FakePipTool::ok());
        saved(store.save(&request("report.py", "x = 1", false)).unwrap());
        let second = store.save(&request("report", "x = 2", false)).unwrap();
        assert!(matches!(second, SaveOutcome::Conflict { ref file_name } if file_name == "report.py"));
        assert!(!tmp.path().join("report.py").exists());
    }

    #[test]
    fn test_invalid_name_touches_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let env = FakeEnvTool::ok();
        let store = store_with(tmp.path(), env.clone(), FakePipTool::ok());
        for bad in ["", "../escape", "a/b", ".hidden"] {
            let err = store.save(&request(bad, "x", true)).unwrap_err();
            assert_eq!(err.outcome_kind(), Some(OutcomeKind::InvalidName), "{bad:?}");
        }
        assert_eq!(env.calls.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_created_at_is_preserved_and_modified_moves_forward() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_with(tmp.path(), FakeEnvTool::ok(), FakePipTool::ok());
        let a = saved(store.save(&request("t", "1", false)).unwrap()).record;
        let b = saved(store.save(&request("t", "2", true)).unwrap()).record;
        let c = saved(store.save(&request("t", "3", true)).unwrap()).record;
        assert_eq!(a.created_at, b.created_at);
        assert_eq!(b.created_at, c.created_at);
        assert!(b.modified_at > a.modified_at);
        assert!(c.modified_at > b.modified_at);
        assert!(tmp.path().join("t").join(RECORD_FILE).exists());
    }

    #[test]
    fn test_overwrite_moves_modified_at_in_listing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_with(tmp.path(), FakeEnvTool::ok(), FakePipTool::ok());
        let catalog = ScriptCatalog::new(ScriptLayout::new(tmp.path()));
        saved(store.save(&request("alpha", "1", false)).unwrap());
        saved(store.save(&request("beta", "1", false)).unwrap());
        let before = catalog.list().unwrap();

        saved(store.save(&request("alpha", "2", true)).unwrap());
        let after = catalog.list().unwrap();

        assert_eq!(after.len(), 2);
        assert_eq!(after[0].name, "alpha");
        assert_eq!(after[0].created_at, before[0].created_at);
        assert!(after[0].modified_at > before[0].modified_at);
        assert_eq!(after[1], before[1]);
    }

    #[test]
    fn test_trailing_space_in_stem_is_rejected_and_listing_stays_consistent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_with(tmp.path(), FakeEnvTool::ok(), FakePipTool::ok());
        let catalog = ScriptCatalog::new(ScriptLayout::new(tmp.path()));

        let err = store.save(&request("report .py", "x", false)).unwrap_err();
        assert_eq!(err.outcome_kind(), Some(OutcomeKind::InvalidName));
        assert!(!tmp.path().join("report ").exists());

        saved(store.save(&request("  report  ", "x", false)).unwrap());
        let names: Vec<_> = catalog.list().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["report"]);
        assert_eq!(catalog.read("report").unwrap(), "x");
    }

    #[test]
    fn test_manifest_created_by_provisioning_is_installed_once() {
        let tmp = tempfile::tempdir().unwrap();
        let pip = FakePipTool::ok();
        let store = store_with(tmp.path(), FakeEnvTool::scaffolding(MANIFEST_FILE), pip.clone());

        let s = saved(store.save(&request("fetch", "import requests", false)).unwrap());
        assert!(s.provisioned);
        assert!(s.install_attempted);
        assert_eq!(pip.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("fetch").join("fetch.py")).unwrap(),
            "import requests"
        );
    }

    #[test]
    fn test_provision_failure_keeps_content_and_retries_next_save() {
        let tmp = tempfile::tempdir().unwrap();
        let env = FakeEnvTool::failing("error: No interpreter found for Python 3.99");
        let store = store_with(tmp.path(), env.clone(), FakePipTool::ok());

        let err = store.save(&request("demo", "print(1)", false)).unwrap_err();
        assert_eq!(err.outcome_kind(), Some(OutcomeKind::ProvisionFailed));
        assert!(err.to_string().contains("No interpreter found"));
        let dir = tmp.path().join("demo");
        assert_eq!(std::fs::read_to_string(dir.join("demo.py")).unwrap(), "print(1)");
        assert!(!dir.join(ENV_MARKER).exists());

        let _ = store.save(&request("demo", "print(2)", true));
        assert_eq!(env.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_install_failure_is_a_warning() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("fetch");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(MANIFEST_FILE), "requests==99\n").unwrap();
        let pip = FakePipTool::failing("No solution found when resolving dependencies");
        let store = store_with(tmp.path(), FakeEnvTool::ok(), pip.clone());

        let out = store.save(&request("fetch", "import requests", false)).unwrap();
        let outcome = out.outcome();
        assert_eq!(outcome.status, OutcomeKind::InstallWarning);
        assert!(outcome.message.contains("No solution found"));
        let s = saved(out);
        assert!(s.install_attempted);
        assert_eq!(std::fs::read_to_string(dir.join("fetch.py")).unwrap(), "import requests");
        assert_eq!(pip.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_manifest_installed_on_every_save() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("fetch");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(MANIFEST_FILE), "requests\n").unwrap();
        let pip = FakePipTool::ok();
        let store = store_with(tmp.path(), FakeEnvTool::ok(), pip.clone());

        saved(store.save(&request("fetch", "a", false)).unwrap());
        saved(store.save(&request("fetch", "b", true)).unwrap());
        assert_eq!(pip.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_record_keeps_provisioned_interpreter() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_with(tmp.path(), FakeEnvTool::ok(), FakePipTool::ok());
        saved(store.save(&request("v", "1", false)).unwrap());
        let mut req = request("v", "2", true);
        req.python_version = "3.12".to_string();
        let s = saved(store.save(&req).unwrap());
        assert_eq!(s.record.python_version, "3.11");
    }

    #[test]
    fn test_concurrent_saves_of_one_script_provision_once() {
        let tmp = tempfile::tempdir().unwrap();
        let env = FakeEnvTool::ok();
        let store = Arc::new(store_with(tmp.path(), env.clone(), FakePipTool::ok()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .save(&request("shared", &format!("print({})", i), true))
                        .unwrap()
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(env.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.locks.len(), 0);
    }

    #[test]
    fn test_lock_entries_are_dropped_after_save() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_with(tmp.path(), FakeEnvTool::ok(), FakePipTool::ok());
        for name in ["a", "b", "c"] {
            saved(store.save(&request(name, "1", false)).unwrap());
        }
        assert!(matches!(
            store.save(&request("a", "2", false)).unwrap(),
            SaveOutcome::Conflict { .. }
        ));
        let _ = store.save(&request("../x", "1", false));
        assert_eq!(store.locks.len(), 0);
    }

    impl SavedScript {
        fn outcome_kind(&self) -> OutcomeKind {
            SaveOutcome::Saved(self.clone()).outcome().status
        }
    }
}
