//! Resolved configuration plus constructors for the services built on it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use scriptlite_core::config::{ConfigStore, PathsConfig, ToolConfig};
use scriptlite_core::script::{ScriptCatalog, ScriptLayout};
use scriptlite_env::versions::VersionSource;
use scriptlite_env::UvTool;

use crate::runner::ScriptRunner;
use crate::store::ScriptStore;

pub struct AppContext {
    pub config_store: ConfigStore,
    pub paths: PathsConfig,
    pub tools: ToolConfig,
}

impl AppContext {
    /// Read env, `.env` and the config file.
    pub fn load() -> Result<Self> {
        let config_store = ConfigStore::from_env().context("Cannot locate config file")?;
        let paths = PathsConfig::resolve(&config_store);
        let tools = ToolConfig::from_env();
        tracing::debug!(
            root = %paths.script_root.display(),
            source = paths.source.as_str(),
            "Resolved script root"
        );
        Ok(Self {
            config_store,
            paths,
            tools,
        })
    }

    pub fn layout(&self) -> ScriptLayout {
        ScriptLayout::new(&self.paths.script_root)
    }

    pub fn catalog(&self) -> ScriptCatalog {
        ScriptCatalog::new(self.layout())
    }

    pub fn uv(&self) -> Result<Arc<UvTool>> {
        Ok(Arc::new(UvTool::locate(&self.tools)?))
    }

    pub fn store(&self) -> Result<ScriptStore> {
        let uv = self.uv()?;
        Ok(ScriptStore::new(self.layout(), uv.clone(), uv))
    }

    pub fn runner(&self) -> Result<ScriptRunner> {
        Ok(ScriptRunner::new(
            self.layout(),
            self.uv()?,
            Duration::from_secs(self.tools.run_timeout_secs),
        ))
    }

    /// Remote feed when built with `remote-versions`, otherwise the fixed list.
    pub fn version_source(&self) -> Arc<dyn VersionSource> {
        #[cfg(feature = "remote-versions")]
        {
            Arc::new(scriptlite_env::versions::GithubReleases::new(
                self.tools.versions_url.clone(),
            ))
        }
        #[cfg(not(feature = "remote-versions"))]
        {
            Arc::new(OfflineVersions)
        }
    }
}

#[cfg(not(feature = "remote-versions"))]
struct OfflineVersions;

#[cfg(not(feature = "remote-versions"))]
impl VersionSource for OfflineVersions {
    fn fetch_tags(&self) -> Result<Vec<String>> {
        anyhow::bail!("built without remote-versions")
    }
}
