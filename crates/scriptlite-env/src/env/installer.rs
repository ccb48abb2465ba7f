//! Install `requirements.txt` into a provisioned environment when present.

use std::path::Path;
use std::sync::Arc;

use scriptlite_core::script::MANIFEST_FILE;
use thiserror::Error;

use crate::tool::DependencyTool;

/// Soft failure: the script is saved, only its dependencies are stale.
#[derive(Debug, Error)]
#[error("Dependency install failed: {details}")]
pub struct InstallError {
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallResult {
    /// false when there was no manifest.
    pub attempted: bool,
}

pub struct DependencyInstaller {
    tool: Arc<dyn DependencyTool>,
}

impl DependencyInstaller {
    pub fn new(tool: Arc<dyn DependencyTool>) -> Self {
        Self { tool }
    }

    pub fn install_if_present(&self, script_dir: &Path) -> Result<InstallResult, InstallError> {
        let manifest = script_dir.join(MANIFEST_FILE);
        if !manifest.is_file() {
            return Ok(InstallResult { attempted: false });
        }

        let requirements = std::fs::read_to_string(&manifest)
            .map(|c| count_requirements(&c))
            .unwrap_or(0);
        tracing::info!(dir = %script_dir.display(), requirements, "Installing dependencies");

        let out = self
            .tool
            .install_requirements(script_dir)
            .map_err(|e| InstallError {
                details: e.to_string(),
            })?;
        if !out.success() {
            let details = out.failure_details("uv pip install");
            tracing::warn!(dir = %script_dir.display(), "{}", details);
            return Err(InstallError { details });
        }
        Ok(InstallResult { attempted: true })
    }
}

/// Non-empty, non-comment lines.
fn count_requirements(content: &str) -> usize {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .count()
}
