//! Isolated per-script Python environments.
//!
//! - `process`: spawn + wait with timeout, structured exit status
//! - `tool`: the `EnvironmentTool` / `DependencyTool` / `RunTool` ports and the `uv` adapter
//! - `env`: provisioning (once per script directory) and dependency install
//! - `versions`: available Python versions with an offline fallback

pub mod env;
pub mod process;
pub mod tool;
pub mod versions;

pub use env::installer::{DependencyInstaller, InstallError, InstallResult};
pub use env::provisioner::{EnvironmentProvisioner, ProvisionError, ProvisionResult};
pub use tool::{DependencyTool, EnvironmentTool, RunTool, ToolError, ToolOutput, ToolStatus, UvTool};
