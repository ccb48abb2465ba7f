//! Environment variable key constants and aliases.
//!
//! Primary keys use `SCRIPTLITE_*`; `PYDASH_*` names from the first dashboard
//! release are still honoured as aliases.

/// Script root and config file location
pub mod paths {
    pub const SCRIPTLITE_SCRIPT_ROOT: &str = "SCRIPTLITE_SCRIPT_ROOT";
    pub const SCRIPT_ROOT_ALIASES: &[&str] = &["PYDASH_SCRIPT_DIR"];

    /// Overrides `~/.scriptlite/config.json`
    pub const SCRIPTLITE_CONFIG_FILE: &str = "SCRIPTLITE_CONFIG_FILE";
}

/// External tool (uv) invocation
pub mod tools {
    /// Explicit path to the `uv` binary; otherwise looked up on PATH.
    pub const SCRIPTLITE_UV_BIN: &str = "SCRIPTLITE_UV_BIN";

    /// Timeout for `uv init` / `uv pip install` (seconds).
    pub const SCRIPTLITE_TOOL_TIMEOUT_SECS: &str = "SCRIPTLITE_TOOL_TIMEOUT_SECS";

    /// Timeout for `scriptlite run` (seconds).
    pub const SCRIPTLITE_RUN_TIMEOUT_SECS: &str = "SCRIPTLITE_RUN_TIMEOUT_SECS";

    pub const SCRIPTLITE_DEFAULT_PYTHON: &str = "SCRIPTLITE_DEFAULT_PYTHON";

    /// Release feed used to list Python versions.
    pub const SCRIPTLITE_VERSIONS_URL: &str = "SCRIPTLITE_VERSIONS_URL";
}

/// HTTP adapter
pub mod server {
    pub const SCRIPTLITE_LISTEN: &str = "SCRIPTLITE_LISTEN";
    pub const LISTEN_ALIASES: &[&str] = &["PYDASH_LISTEN"];
}

/// Observability and logging
pub mod observability {
    pub const SCRIPTLITE_QUIET: &str = "SCRIPTLITE_QUIET";
    pub const QUIET_ALIASES: &[&str] = &["PYDASH_QUIET"];

    pub const SCRIPTLITE_LOG_LEVEL: &str = "SCRIPTLITE_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &["PYDASH_LOG_LEVEL"];

    pub const SCRIPTLITE_LOG_JSON: &str = "SCRIPTLITE_LOG_JSON";

    pub const SCRIPTLITE_AUDIT_LOG: &str = "SCRIPTLITE_AUDIT_LOG";
}
