//! Observability: tracing init and the JSONL audit log.
//!
//! Uses config::ObservabilityConfig for SCRIPTLITE_QUIET, LOG_LEVEL, LOG_JSON, AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

static AUDIT_PATH: Mutex<Option<String>> = Mutex::new(None);

/// Initialize tracing. Call at process startup.
/// When SCRIPTLITE_QUIET=1, only WARN and above are logged.
pub fn init_tracing() {
    let cfg = crate::config::ObservabilityConfig::from_env();
    let level: String = if cfg.quiet {
        "scriptlite=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
}

fn get_audit_path() -> Option<String> {
    {
        let guard = AUDIT_PATH.lock().ok()?;
        if let Some(ref p) = *guard {
            return Some(p.clone());
        }
    }
    let path = crate::config::ObservabilityConfig::from_env()
        .audit_log
        .clone()?;
    if path.is_empty() {
        return None;
    }
    if let Some(parent) = Path::new(&path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    {
        let mut guard = AUDIT_PATH.lock().ok()?;
        *guard = Some(path.clone());
    }
    Some(path)
}

fn append_jsonl(path: &str, record: &serde_json::Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Audit: script_saved
pub fn audit_script_saved(script: &str, overwrite: bool, provisioned: bool, install_warning: bool) {
    if let Some(path) = get_audit_path() {
        let record = json!({
            "ts": now_ts(),
            "event": "script_saved",
            "script": script,
            "overwrite": overwrite,
            "provisioned": provisioned,
            "install_warning": install_warning,
        });
        append_jsonl(&path, &record);
    }
}

/// Audit: tool_invoked (right before spawn)
pub fn audit_tool_invoked(cmd: &str, args: &[String], cwd: &Path) {
    if let Some(path) = get_audit_path() {
        let record = json!({
            "ts": now_ts(),
            "event": "tool_invoked",
            "cmd": cmd,
            "args": args,
            "cwd": cwd.to_string_lossy(),
        });
        append_jsonl(&path, &record);
    }
}

/// Audit: tool_completed
pub fn audit_tool_completed(cmd: &str, exit_code: i32, timed_out: bool, duration_ms: u64) {
    if let Some(path) = get_audit_path() {
        let record = json!({
            "ts": now_ts(),
            "event": "tool_completed",
            "cmd": cmd,
            "exit_code": exit_code,
            "timed_out": timed_out,
            "duration_ms": duration_ms,
            "success": exit_code == 0 && !timed_out,
        });
        append_jsonl(&path, &record);
    }
}
