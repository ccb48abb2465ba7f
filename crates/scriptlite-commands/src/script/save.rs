//! `scriptlite save`: Store a script and provision its environment.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use scriptlite_env::versions::normalize_requested;

use crate::context::AppContext;
use crate::store::{SaveOutcome, SaveRequest};

/// `scriptlite save <name> [--file <path>|-|--content <text>] [--python-version <v>] [--force]`
///
/// Content comes from `--content`, then `--file`, else stdin.
pub fn cmd_save(
    name: &str,
    file: Option<&Path>,
    inline: Option<&str>,
    python: Option<&str>,
    overwrite: bool,
    json_output: bool,
) -> Result<()> {
    let content = match inline {
        Some(text) => text.to_string(),
        None => read_content(file)?,
    };
    let ctx = AppContext::load()?;
    let store = ctx.store()?;
    let req = SaveRequest {
        name: name.to_string(),
        content,
        python_version: normalize_requested(python, &ctx.tools.default_python),
        overwrite,
    };

    let outcome = match store.save(&req) {
        Ok(o) => o,
        Err(e) => {
            if json_output {
                if let Some(outcome) = e.outcome() {
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                }
            }
            return Err(e.into());
        }
    };

    let report = outcome.outcome();
    if json_output {
        let script = match &outcome {
            SaveOutcome::Saved(s) => Some(s),
            SaveOutcome::Conflict { .. } => None,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "status": report.status,
                "message": report.message,
                "script": script,
            }))?
        );
    } else if report.status.is_success() {
        eprintln!("{}", report.message);
    }

    if !report.status.is_success() {
        anyhow::bail!("{}", report.message);
    }
    Ok(())
}

fn read_content(file: Option<&Path>) -> Result<String> {
    match file {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read script source: {}", p.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read script source from stdin")?;
            Ok(buf)
        }
    }
}
