//! `scriptlite versions`: Python versions offered for new environments.

use anyhow::Result;

use scriptlite_env::versions::available_versions;

use crate::context::AppContext;

/// `scriptlite versions [--json]`
pub fn cmd_versions(json_output: bool) -> Result<()> {
    let ctx = AppContext::load()?;
    let versions = available_versions(ctx.version_source().as_ref());

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "versions": versions,
                "default": ctx.tools.default_python,
            }))?
        );
        return Ok(());
    }

    for v in &versions {
        if *v == ctx.tools.default_python {
            eprintln!("  {} (default)", v);
        } else {
            eprintln!("  {}", v);
        }
    }
    Ok(())
}
