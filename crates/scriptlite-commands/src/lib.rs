//! ScriptLite commands: the script lifecycle manager and the entry points
//! (CLI commands, HTTP gateway) built on top of it.

pub mod config;
pub mod context;
pub mod runner;
pub mod script;
pub mod store;
pub mod versions;

#[cfg(feature = "gateway")]
pub mod gateway;

#[cfg(test)]
pub(crate) mod testing;

pub use context::AppContext;
pub use runner::{RunError, RunReport, ScriptRunner};
pub use store::{SaveError, SaveOutcome, SaveRequest, SavedScript, ScriptStore};
