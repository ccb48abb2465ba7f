//! Ports for the external tools, and the `uv` adapter that implements them.
//!
//! Tools report a structured [`ToolOutput`]; a non-zero exit is data, not an
//! `Err`. `Err(ToolError)` is reserved for "could not run the tool at all".

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use scriptlite_core::config::ToolConfig;
use scriptlite_core::script::MANIFEST_FILE;
use thiserror::Error;

use crate::process::run_with_timeout;

/// How a tool invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    Exited(i32),
    /// Killed once the configured limit elapsed.
    TimedOut { after: Duration },
}

/// Captured result of one tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ToolStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl ToolOutput {
    /// Successful exit with the given stdout (handy for fakes).
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Exited(0),
            stdout: stdout.into(),
            stderr: String::new(),
            duration: Duration::ZERO,
        }
    }

    /// Failed exit with the given stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Exited(code),
            stdout: String::new(),
            stderr: stderr.into(),
            duration: Duration::ZERO,
        }
    }

    pub fn success(&self) -> bool {
        self.status == ToolStatus::Exited(0)
    }

    /// One-line description of a failure, carrying the tool's own error text.
    pub fn failure_details(&self, what: &str) -> String {
        match self.status {
            ToolStatus::TimedOut { after } => {
                format!("{} timed out after {}", what, describe_limit(after))
            }
            ToolStatus::Exited(code) => {
                let text = if self.stderr.trim().is_empty() {
                    self.stdout.trim()
                } else {
                    self.stderr.trim()
                };
                if text.is_empty() {
                    format!("{} exited with code {}", what, code)
                } else {
                    format!("{} exited with code {}: {}", what, code, text)
                }
            }
        }
    }
}

fn describe_limit(limit: Duration) -> String {
    if limit.subsec_millis() == 0 {
        format!("{} seconds", limit.as_secs())
    } else {
        format!("{} ms", limit.as_millis())
    }
}

/// The tool could not be started or awaited.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{tool} not found on PATH (set SCRIPTLITE_UV_BIN to override)")]
    NotFound { tool: String },

    #[error("Failed to launch {cmd}: {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for {cmd}: {source}")]
    Wait {
        cmd: String,
        #[source]
        source: std::io::Error,
    },
}

/// Creates an isolated environment in a script directory.
pub trait EnvironmentTool: Send + Sync {
    fn init(&self, script_dir: &Path, python_version: &str) -> Result<ToolOutput, ToolError>;
}

/// Installs the manifest into an already provisioned environment.
pub trait DependencyTool: Send + Sync {
    fn install_requirements(&self, script_dir: &Path) -> Result<ToolOutput, ToolError>;
}

/// Runs a stored script inside its environment.
pub trait RunTool: Send + Sync {
    fn run_script(
        &self,
        script_dir: &Path,
        file_name: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ToolOutput, ToolError>;
}

/// `uv` adapter: `uv init` + `uv venv`, `uv pip install -r`, `uv run`.
#[derive(Debug, Clone)]
pub struct UvTool {
    bin: PathBuf,
    timeout: Duration,
}

impl UvTool {
    pub fn new(bin: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    /// `SCRIPTLITE_UV_BIN`, else `uv` on PATH.
    pub fn locate(cfg: &ToolConfig) -> Result<Self, ToolError> {
        let bin = match &cfg.uv_bin {
            Some(p) => p.clone(),
            None => which::which("uv").map_err(|_| ToolError::NotFound {
                tool: "uv".to_string(),
            })?,
        };
        tracing::debug!(uv = %bin.display(), "Using uv");
        Ok(Self::new(bin, Duration::from_secs(cfg.tool_timeout_secs)))
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }

    fn command(&self, dir: &Path) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(dir);
        cmd
    }
}

impl EnvironmentTool for UvTool {
    fn init(&self, script_dir: &Path, python_version: &str) -> Result<ToolOutput, ToolError> {
        // A previous attempt may have got past `uv init` and failed later;
        // `uv init` refuses to run twice in the same project.
        if !script_dir.join("pyproject.toml").exists() {
            let mut cmd = self.command(script_dir);
            cmd.args(["init", "--python", python_version]);
            let out = run_with_timeout(&mut cmd, self.timeout)?;
            if !out.success() {
                return Ok(out);
            }
        }
        let mut cmd = self.command(script_dir);
        cmd.args(["venv", "--python", python_version]);
        run_with_timeout(&mut cmd, self.timeout)
    }
}

impl DependencyTool for UvTool {
    fn install_requirements(&self, script_dir: &Path) -> Result<ToolOutput, ToolError> {
        let mut cmd = self.command(script_dir);
        cmd.args(["pip", "install", "-r", MANIFEST_FILE]);
        run_with_timeout(&mut cmd, self.timeout)
    }
}

impl RunTool for UvTool {
    fn run_script(
        &self,
        script_dir: &Path,
        file_name: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ToolOutput, ToolError> {
        let mut cmd = self.command(script_dir);
        cmd.arg("run").arg(file_name).args(args);
        run_with_timeout(&mut cmd, timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_details_prefers_stderr() {
        let mut out = ToolOutput::failed(2, "  error: no python 3.99  ");
        out.stdout = "noise".into();
        assert_eq!(
            out.failure_details("uv init"),
            "uv init exited with code 2: error: no python 3.99"
        );
    }

    #[test]
    fn test_failure_details_timeout_and_silent_exit() {
        let mut out = ToolOutput::failed(1, "");
        assert_eq!(out.failure_details("uv pip install"), "uv pip install exited with code 1");
        out.status = ToolStatus::TimedOut {
            after: Duration::from_secs(9),
        };
        assert_eq!(out.failure_details("uv pip install"), "uv pip install timed out after 9 seconds");
        out.status = ToolStatus::TimedOut {
            after: Duration::from_millis(200),
        };
        assert_eq!(out.failure_details("uv run"), "uv run timed out after 200 ms");
        assert!(!out.success());
    }

    #[test]
    fn test_locate_honours_explicit_bin() {
        let cfg = ToolConfig {
            uv_bin: Some(PathBuf::from("/opt/uv/bin/uv")),
            tool_timeout_secs: 12,
            run_timeout_secs: 5,
            default_python: "3.12".into(),
            versions_url: String::new(),
        };
        let tool = UvTool::locate(&cfg).unwrap();
        assert_eq!(tool.bin(), Path::new("/opt/uv/bin/uv"));
    }

    #[cfg(unix)]
    #[test]
    fn test_uv_command_lines() {
        // `echo` stands in for uv and prints the argument list back.
        let tmp = tempfile::tempdir().unwrap();
        let uv = UvTool::new("echo", Duration::from_secs(10));

        let init = uv.init(tmp.path(), "3.11").unwrap();
        assert!(init.success());
        assert_eq!(init.stdout.trim(), "venv --python 3.11");

        let install = uv.install_requirements(tmp.path()).unwrap();
        assert_eq!(install.stdout.trim(), "pip install -r requirements.txt");

        let run = uv
            .run_script(tmp.path(), "demo.py", &["--flag".to_string()], Duration::from_secs(10))
            .unwrap();
        assert_eq!(run.stdout.trim(), "run demo.py --flag");
    }
}
