//! `scriptlite run`: Execute a stored script in its environment.

use anyhow::Result;
use std::time::Duration;

use crate::context::AppContext;

/// `scriptlite run <name> [--timeout <secs>] [-- args...]`
///
/// Streams nothing: output is captured and replayed once the script ends.
/// The script's exit code becomes ours.
pub fn cmd_run(
    name: &str,
    args: &[String],
    timeout_secs: Option<u64>,
    json_output: bool,
) -> Result<i32> {
    let ctx = AppContext::load()?;
    let runner = ctx.runner()?;
    let report = runner.run(name, args, timeout_secs.map(Duration::from_secs))?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.stdout);
        eprint!("{}", report.stderr);
        if report.timed_out {
            eprintln!("⏱ {} timed out after {}ms", report.file_name, report.duration_ms);
        }
    }
    Ok(report.exit_code.unwrap_or(124))
}
