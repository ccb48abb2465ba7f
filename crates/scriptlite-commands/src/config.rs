//! `scriptlite config`: Show or change where scripts are stored.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use scriptlite_core::config::env_keys::paths;
use scriptlite_core::config::{env_optional, ConfigStore, RootConfig};

use crate::context::AppContext;

/// `scriptlite config show [--json]`
pub fn cmd_config_show(json_output: bool) -> Result<()> {
    let ctx = AppContext::load()?;
    let uv = ctx
        .uv()
        .map(|t| t.bin().display().to_string())
        .unwrap_or_else(|e| format!("unavailable ({})", e));

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "scriptRootDirectory": ctx.paths.script_root,
                "source": ctx.paths.source.as_str(),
                "configFile": ctx.config_store.path(),
                "uv": uv,
                "defaultPython": ctx.tools.default_python,
                "toolTimeoutSecs": ctx.tools.tool_timeout_secs,
            }))?
        );
        return Ok(());
    }

    eprintln!(
        "Script root:    {} ({})",
        ctx.paths.script_root.display(),
        ctx.paths.source.as_str()
    );
    eprintln!("Config file:    {}", ctx.config_store.path().display());
    eprintln!("uv:             {}", uv);
    eprintln!("Default Python: {}", ctx.tools.default_python);
    eprintln!("Tool timeout:   {}s", ctx.tools.tool_timeout_secs);
    Ok(())
}

/// `scriptlite config set-root <dir>`
pub fn cmd_config_set_root(dir: &Path) -> Result<()> {
    let store = ConfigStore::from_env().context("Cannot locate config file")?;
    let root = set_root(&store, dir)?;
    eprintln!("✓ Script root set to {}", root.display());
    if env_optional(paths::SCRIPTLITE_SCRIPT_ROOT, paths::SCRIPT_ROOT_ALIASES).is_some() {
        eprintln!("  Note: SCRIPTLITE_SCRIPT_ROOT is set and takes precedence.");
    }
    Ok(())
}

/// Persist `dir` (made absolute) as the script root and create it.
fn set_root(store: &ConfigStore, dir: &Path) -> Result<PathBuf> {
    let root = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Cannot determine current directory")?
            .join(dir)
    };
    std::fs::create_dir_all(&root)
        .with_context(|| format!("Failed to create script root: {}", root.display()))?;
    store.save(&RootConfig {
        script_root_directory: root.clone(),
    })?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_root_creates_and_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(tmp.path().join("cfg").join("config.json"));
        let root = tmp.path().join("scripts");

        let saved = set_root(&store, &root).unwrap();
        assert_eq!(saved, root);
        assert!(root.is_dir());
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.script_root_directory, root);
    }
}
