//! Name → path resolution for the per-script directory layout.

use std::path::{Path, PathBuf};

use super::{ScriptError, SCRIPT_SUFFIX};

/// Characters that would escape the root or are not portable in file names.
const FORBIDDEN_CHARS: &[char] = &['/', '\\', '\0', ':', '*', '?', '"', '<', '>', '|'];

/// Resolved locations for one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPaths {
    /// Name without suffix, also the directory name.
    pub stem: String,
    /// `<stem>.py`
    pub file_name: String,
    /// `<root>/<stem>`
    pub dir: PathBuf,
    /// `<root>/<stem>/<stem>.py`
    pub file: PathBuf,
}

impl ScriptPaths {
    pub fn record_path(&self) -> PathBuf {
        self.dir.join(super::RECORD_FILE)
    }

    pub fn marker_path(&self) -> PathBuf {
        self.dir.join(super::ENV_MARKER)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(super::MANIFEST_FILE)
    }
}

/// The script root, injected once and shared by store and catalog.
#[derive(Debug, Clone)]
pub struct ScriptLayout {
    root: PathBuf,
}

impl ScriptLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Compute `(dir, file)` for `name`. Pure: touches nothing on disk.
    pub fn resolve(&self, name: &str) -> Result<ScriptPaths, ScriptError> {
        let file_name = normalize_file_name(name)?;
        let stem = file_name[..file_name.len() - SCRIPT_SUFFIX.len()].to_string();
        let dir = self.root.join(&stem);
        let file = dir.join(&file_name);
        Ok(ScriptPaths {
            stem,
            file_name,
            dir,
            file,
        })
    }
}

/// Trim, validate and append `.py` once.
pub fn normalize_file_name(name: &str) -> Result<String, ScriptError> {
    let invalid = |reason| ScriptError::InvalidName {
        name: name.to_string(),
        reason,
    };

    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid("name is empty"));
    }
    let file_name = if trimmed.ends_with(SCRIPT_SUFFIX) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, SCRIPT_SUFFIX)
    };
    let stem = &file_name[..file_name.len() - SCRIPT_SUFFIX.len()];

    if stem.trim().is_empty() {
        return Err(invalid("name has no stem"));
    }
    // "report .py" would live in "report /" but resolve back to "report"
    if stem != stem.trim() {
        return Err(invalid("name has whitespace around the stem"));
    }
    if stem.starts_with('.') {
        return Err(invalid("name must not start with '.'"));
    }
    if stem.chars().any(|c| FORBIDDEN_CHARS.contains(&c) || c.is_control()) {
        return Err(invalid("name contains a path separator or reserved character"));
    }
    Ok(file_name)
}
