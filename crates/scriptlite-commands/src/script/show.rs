//! `scriptlite show`: Print a stored script.

use anyhow::Result;

use crate::context::AppContext;

/// `scriptlite show <name> [--json]`
///
/// Plain mode writes the raw content to stdout so it can be piped.
pub fn cmd_show(name: &str, json_output: bool) -> Result<()> {
    let ctx = AppContext::load()?;
    let catalog = ctx.catalog();
    let entry = catalog.record(name)?;
    let content = catalog.read(name)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "script": entry,
                "content": content,
            }))?
        );
    } else {
        eprintln!(
            "# {} (modified {})",
            entry.file_name,
            entry.modified_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        print!("{}", content);
    }
    Ok(())
}
