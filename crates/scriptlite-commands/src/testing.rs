//! In-memory stand-ins for the external tools.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use scriptlite_env::versions::VersionSource;
use scriptlite_env::{DependencyTool, EnvironmentTool, RunTool, ToolError, ToolOutput, ToolStatus};

pub struct FakeEnvTool {
    pub calls: AtomicUsize,
    scaffold: Option<&'static str>,
    failure: Option<String>,
}

impl FakeEnvTool {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            scaffold: None,
            failure: None,
        })
    }

    /// Succeeds and leaves a stock entry file behind, like `uv init`.
    pub fn scaffolding(file: &'static str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            scaffold: Some(file),
            failure: None,
        })
    }

    pub fn failing(stderr: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            scaffold: None,
            failure: Some(stderr.to_string()),
        })
    }
}

impl EnvironmentTool for FakeEnvTool {
    fn init(&self, dir: &Path, _python_version: &str) -> Result<ToolOutput, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // widen the window for racing saves
        std::thread::sleep(Duration::from_millis(10));
        if let Some(stderr) = &self.failure {
            return Ok(ToolOutput::failed(2, stderr.clone()));
        }
        if let Some(f) = self.scaffold {
            std::fs::write(dir.join(f), "def main():\n    print(\"Hello from uv!\")\n").map_err(
                |source| ToolError::Spawn {
                    cmd: "uv".to_string(),
                    source,
                },
            )?;
        }
        Ok(ToolOutput::ok("Initialized project"))
    }
}

pub struct FakePipTool {
    pub calls: AtomicUsize,
    failure: Option<String>,
}

impl FakePipTool {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failure: None,
        })
    }

    pub fn failing(stderr: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failure: Some(stderr.to_string()),
        })
    }
}

impl DependencyTool for FakePipTool {
    fn install_requirements(&self, _dir: &Path) -> Result<ToolOutput, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match &self.failure {
            Some(stderr) => ToolOutput::failed(1, stderr.clone()),
            None => ToolOutput::ok("Resolved 1 package"),
        })
    }
}

/// Echoes the script name and arguments; `timeout` scripts time out.
#[derive(Default)]
pub struct FakeRunner {
    pub last_args: Mutex<Vec<String>>,
}

impl RunTool for FakeRunner {
    fn run_script(
        &self,
        _dir: &Path,
        file_name: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ToolOutput, ToolError> {
        *self.last_args.lock().unwrap() = args.to_vec();
        if file_name == "timeout.py" {
            return Ok(ToolOutput {
                status: ToolStatus::TimedOut { after: timeout },
                stdout: String::new(),
                stderr: String::new(),
                duration: timeout,
            });
        }
        let mut out = ToolOutput::ok(format!("ran {} {}", file_name, args.join(" ")));
        out.duration = Duration::from_millis(7);
        Ok(out)
    }
}

pub struct FixedVersions(pub Vec<&'static str>);

impl VersionSource for FixedVersions {
    fn fetch_tags(&self) -> anyhow::Result<Vec<String>> {
        if self.0.is_empty() {
            anyhow::bail!("offline");
        }
        Ok(self.0.iter().map(|s| s.to_string()).collect())
    }
}
