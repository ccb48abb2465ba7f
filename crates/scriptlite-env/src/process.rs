//! Run external commands with a timeout.
//!
//! stdout/stderr are drained in background threads while the child runs;
//! otherwise a child writing more than the pipe buffer (~64KB) would block
//! and we would wait on it forever.
//!
//! On unix the child leads its own process group, so a timeout kills the
//! whole tree (`uv run` -> python -> anything it forked). Readers are only
//! awaited for a short grace period after the child is reaped: a descendant
//! that escaped the group may keep the pipes open indefinitely.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use scriptlite_core::observability;

use crate::tool::{ToolError, ToolOutput, ToolStatus};

/// Poll interval while waiting for the child.
const POLL_INTERVAL_MS: u64 = 50;

/// How long to wait for the pipe readers once the child is gone.
const READER_GRACE: Duration = Duration::from_millis(500);

/// Spawn `cmd` and wait at most `timeout`. The child's process group is
/// killed on expiry.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<ToolOutput, ToolError> {
    let program = cmd.get_program().to_string_lossy().to_string();
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().to_string())
        .collect();
    let cwd = cmd
        .get_current_dir()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();
    observability::audit_tool_invoked(&program, &args, &cwd);
    tracing::debug!(cmd = %program, args = ?args, cwd = %cwd.display(), "Spawning tool");

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ToolError::Spawn {
            cmd: program.clone(),
            source,
        })?;

    let start = Instant::now();
    let output = wait_with_timeout(&mut child, timeout).map_err(|source| ToolError::Wait {
        cmd: program.clone(),
        source,
    })?;

    let elapsed = start.elapsed();
    let (code, timed_out) = match output.status {
        ToolStatus::Exited(code) => (code, false),
        ToolStatus::TimedOut { .. } => (-1, true),
    };
    observability::audit_tool_completed(&program, code, timed_out, elapsed.as_millis() as u64);
    if timed_out {
        tracing::warn!(cmd = %program, timeout_ms = timeout.as_millis() as u64, "Tool timed out and was killed");
    } else {
        tracing::debug!(cmd = %program, exit_code = code, duration_ms = elapsed.as_millis() as u64, "Tool finished");
    }
    Ok(output)
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> std::io::Result<ToolOutput> {
    let start = Instant::now();
    let stdout_rx = child.stdout.take().map(drain);
    let stderr_rx = child.stderr.take().map(drain);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let deadline = Instant::now() + READER_GRACE;
                return Ok(ToolOutput {
                    status: ToolStatus::Exited(status.code().unwrap_or(-1)),
                    stdout: collect(stdout_rx, deadline),
                    stderr: collect(stderr_rx, deadline),
                    duration: start.elapsed(),
                });
            }
            Ok(None) => {}
            Err(e) => {
                kill_tree(child);
                let _ = child.wait();
                return Err(e);
            }
        }

        if start.elapsed() > timeout {
            kill_tree(child);
            let _ = child.wait();
            let deadline = Instant::now() + READER_GRACE;
            return Ok(ToolOutput {
                status: ToolStatus::TimedOut { after: timeout },
                stdout: collect(stdout_rx, deadline),
                stderr: collect(stderr_rx, deadline),
                duration: start.elapsed(),
            });
        }

        thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
    }
}

/// Read a pipe to EOF on its own thread.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Whatever the reader produced by `deadline`; empty if it is still blocked.
fn collect(rx: Option<Receiver<String>>, deadline: Instant) -> String {
    rx.and_then(|rx| {
        rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            .ok()
    })
    .unwrap_or_default()
}

#[cfg(unix)]
fn kill_tree(child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    // The child is the group leader (pgid == pid).
    if let Err(e) = killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL) {
        tracing::debug!(pid = child.id(), error = %e, "killpg failed, killing child only");
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    let _ = child.kill();
}
