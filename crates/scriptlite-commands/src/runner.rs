//! One-shot execution of a stored script inside its environment.

use std::sync::Arc;
use std::time::Duration;

use scriptlite_core::script::{ScriptError, ScriptLayout};
use scriptlite_env::{RunTool, ToolError, ToolStatus};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// Captured result of a run. A non-zero exit is reported, not raised.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub file_name: String,
    /// `None` when the run was killed on timeout.
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

pub struct ScriptRunner {
    layout: ScriptLayout,
    tool: Arc<dyn RunTool>,
    default_timeout: Duration,
}

impl ScriptRunner {
    pub fn new(layout: ScriptLayout, tool: Arc<dyn RunTool>, default_timeout: Duration) -> Self {
        Self {
            layout,
            tool,
            default_timeout,
        }
    }

    pub fn run(
        &self,
        name: &str,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<RunReport, RunError> {
        let paths = self.layout.resolve(name)?;
        if !paths.file.is_file() {
            return Err(ScriptError::NotFound(paths.stem).into());
        }
        let timeout = timeout.unwrap_or(self.default_timeout);
        tracing::info!(script = %paths.file_name, args = ?args, "Running script");

        let out = self
            .tool
            .run_script(&paths.dir, &paths.file_name, args, timeout)?;
        let (exit_code, timed_out) = match out.status {
            ToolStatus::Exited(code) => (Some(code), false),
            ToolStatus::TimedOut { .. } => (None, true),
        };
        Ok(RunReport {
            file_name: paths.file_name,
            exit_code,
            timed_out,
            stdout: out.stdout,
            stderr: out.stderr,
            duration_ms: out.duration.as_millis() as u64,
        })
    }
}
