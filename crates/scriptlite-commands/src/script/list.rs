//! `scriptlite list`: List stored scripts with their timestamps.

use anyhow::Result;
use chrono::{DateTime, Local, Utc};

use scriptlite_core::script::ScriptEntry;

use crate::context::AppContext;

/// `scriptlite list [--json]`
pub fn cmd_list(json_output: bool) -> Result<()> {
    let ctx = AppContext::load()?;
    let scripts = ctx.catalog().list()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&scripts)?);
        return Ok(());
    }

    if scripts.is_empty() {
        eprintln!(
            "No scripts in {}. Run `scriptlite save` first.",
            ctx.paths.script_root.display()
        );
        return Ok(());
    }

    eprintln!("📜 Scripts in {}:", ctx.paths.script_root.display());
    for entry in &scripts {
        eprintln!("{}", format_row(entry));
    }
    eprintln!("\n{} script(s)", scripts.len());
    Ok(())
}

fn local(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn format_row(entry: &ScriptEntry) -> String {
    let env = match (&entry.python_version, entry.environment_ready) {
        (Some(v), true) => format!("python {}", v),
        (Some(v), false) => format!("python {} (no env)", v),
        (None, true) => "env ready".to_string(),
        (None, false) => "no env".to_string(),
    };
    format!(
        "  {:<24} created {}  modified {}  [{}]",
        entry.file_name,
        local(&entry.created_at),
        local(&entry.modified_at),
        env
    )
}
