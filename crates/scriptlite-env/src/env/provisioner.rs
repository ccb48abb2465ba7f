//! Provision an isolated environment for a script directory, at most once.
//!
//! The [`EnvironmentMarker`] is the only signal: present means done. A later
//! change of Python version or manifest does not re-provision.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use scriptlite_core::script::{EnvironmentMarker, ScriptPaths};
use thiserror::Error;

use crate::tool::EnvironmentTool;

/// Entry files the tool may scaffold (`uv init` has used both names).
pub const STOCK_ENTRY_FILES: &[&str] = &["main.py", "hello.py"];

#[derive(Debug, Error)]
#[error("Environment provisioning failed: {details}")]
pub struct ProvisionError {
    pub details: String,
}

impl ProvisionError {
    fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionResult {
    /// false when the marker already existed and nothing ran.
    pub created: bool,
}

pub struct EnvironmentProvisioner {
    tool: Arc<dyn EnvironmentTool>,
}

impl EnvironmentProvisioner {
    pub fn new(tool: Arc<dyn EnvironmentTool>) -> Self {
        Self { tool }
    }

    /// Ensure the environment exists for `paths.dir`.
    ///
    /// The directory must already exist. After a successful tool run any
    /// scaffolded entry file is moved to `paths.file`, or dropped if the
    /// script is already there, and the marker is written last.
    pub fn ensure(
        &self,
        paths: &ScriptPaths,
        python_version: &str,
    ) -> Result<ProvisionResult, ProvisionError> {
        if EnvironmentMarker::exists(&paths.dir) {
            tracing::debug!(script = %paths.stem, "Environment already provisioned");
            return Ok(ProvisionResult { created: false });
        }

        let preexisting: Vec<bool> = STOCK_ENTRY_FILES
            .iter()
            .map(|f| paths.dir.join(f).exists())
            .collect();

        tracing::info!(script = %paths.stem, python = %python_version, "Provisioning environment");
        let out = self
            .tool
            .init(&paths.dir, python_version)
            .map_err(|e| ProvisionError::new(e.to_string()))?;
        if !out.success() {
            return Err(ProvisionError::new(out.failure_details("uv init")));
        }

        for (stock, existed) in STOCK_ENTRY_FILES.iter().zip(preexisting) {
            if !existed {
                relocate_stock_entry(&paths.dir.join(stock), &paths.file)?;
            }
        }

        EnvironmentMarker {
            python_version: python_version.to_string(),
            provisioned_at: Utc::now(),
        }
        .store(&paths.dir)
        .map_err(|e| ProvisionError::new(format!("could not write environment marker: {}", e)))?;

        tracing::info!(script = %paths.stem, "Environment ready");
        Ok(ProvisionResult { created: true })
    }
}

/// Move a tool-created entry file onto the canonical script path.
///
/// User content always wins: if the script already exists the stock file is removed.
fn relocate_stock_entry(stock: &Path, script: &Path) -> Result<(), ProvisionError> {
    if !stock.is_file() || stock == script {
        return Ok(());
    }
    let result = if script.exists() {
        std::fs::remove_file(stock)
    } else {
        std::fs::rename(stock, script)
    };
    result.map_err(|e| {
        ProvisionError::new(format!(
            "could not relocate {} to {}: {}",
            stock.display(),
            script.display(),
            e
        ))
    })
}
