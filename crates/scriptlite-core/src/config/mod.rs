//! Unified configuration layer.
//!
//! All environment variable reads go through this module; business code uses
//! the structured configs instead of calling `std::env::var` directly.
//!
//! - `loader`: `env_or`, `env_optional`, `env_bool` and `.env` loading
//! - `schema`: `PathsConfig`, `ToolConfig`, `ServerConfig`, `ObservabilityConfig`
//! - `env_keys`: key constants (with legacy aliases)
//! - `store`: the persisted `{scriptRootDirectory}` record

pub mod env_keys;
pub mod loader;
pub mod schema;
pub mod store;

pub use loader::{env_bool, env_optional, env_or, load_dotenv};
pub use schema::{ObservabilityConfig, PathsConfig, ServerConfig, ToolConfig};
pub use store::{ConfigError, ConfigStore, RootConfig};
