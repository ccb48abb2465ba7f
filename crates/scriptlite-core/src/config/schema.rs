//! Config structs grouped by concern, loaded from environment variables.

use super::env_keys::{observability as obv_keys, paths, server, tools};
use super::loader::{env_bool, env_optional, env_or, env_u64};
use super::store::ConfigStore;
use std::path::PathBuf;

/// Default Python version when the caller does not pick one.
pub const DEFAULT_PYTHON_VERSION: &str = "3.12";

/// Default timeout for environment tools (seconds).
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 600;

/// Default timeout for one-shot script runs (seconds).
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 60;

/// Default listen address of the HTTP adapter.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5001";

/// Where scripts live.
#[derive(Debug, Clone)]
pub struct PathsConfig {
    pub script_root: PathBuf,
    /// Where the root came from, for `config show`.
    pub source: RootSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSource {
    Env,
    ConfigFile,
    Default,
}

impl RootSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Env => "environment",
            Self::ConfigFile => "config file",
            Self::Default => "default",
        }
    }
}

impl PathsConfig {
    /// `$SCRIPTLITE_SCRIPT_ROOT` → config store record → `~/scriptlite/scripts`.
    pub fn resolve(store: &ConfigStore) -> Self {
        super::loader::load_dotenv();
        if let Some(root) = env_optional(paths::SCRIPTLITE_SCRIPT_ROOT, paths::SCRIPT_ROOT_ALIASES)
        {
            return Self {
                script_root: PathBuf::from(root),
                source: RootSource::Env,
            };
        }
        match store.load() {
            Ok(Some(cfg)) => {
                return Self {
                    script_root: cfg.script_root_directory,
                    source: RootSource::ConfigFile,
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring unreadable config: {}", e),
        }
        Self {
            script_root: Self::default_root(),
            source: RootSource::Default,
        }
    }

    pub fn default_root() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scriptlite")
            .join("scripts")
    }
}

/// External tool settings.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub uv_bin: Option<PathBuf>,
    pub tool_timeout_secs: u64,
    pub run_timeout_secs: u64,
    pub default_python: String,
    pub versions_url: String,
}

impl ToolConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            uv_bin: env_optional(tools::SCRIPTLITE_UV_BIN, &[]).map(PathBuf::from),
            tool_timeout_secs: env_u64(
                tools::SCRIPTLITE_TOOL_TIMEOUT_SECS,
                &[],
                DEFAULT_TOOL_TIMEOUT_SECS,
            ),
            run_timeout_secs: env_u64(
                tools::SCRIPTLITE_RUN_TIMEOUT_SECS,
                &[],
                DEFAULT_RUN_TIMEOUT_SECS,
            ),
            default_python: env_or(tools::SCRIPTLITE_DEFAULT_PYTHON, &[], || {
                DEFAULT_PYTHON_VERSION.to_string()
            }),
            versions_url: env_or(tools::SCRIPTLITE_VERSIONS_URL, &[], || {
                "https://api.github.com/repos/actions/python-versions/releases".to_string()
            }),
        }
    }
}

/// HTTP adapter settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            listen: env_or(server::SCRIPTLITE_LISTEN, server::LISTEN_ALIASES, || {
                DEFAULT_LISTEN_ADDR.to_string()
            }),
        }
    }
}

/// Observability: quiet, log_level, log_json, audit_log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::SCRIPTLITE_QUIET, obv_keys::QUIET_ALIASES, false),
                log_level: env_or(
                    obv_keys::SCRIPTLITE_LOG_LEVEL,
                    obv_keys::LOG_LEVEL_ALIASES,
                    || "scriptlite=info".to_string(),
                ),
                log_json: env_bool(obv_keys::SCRIPTLITE_LOG_JSON, &[], false),
                audit_log: env_optional(obv_keys::SCRIPTLITE_AUDIT_LOG, &[]),
            }
        })
    }
}
