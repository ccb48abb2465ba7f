//! ScriptLite core: configuration, on-disk script layout, catalog and observability.
//!
//! Everything here is synchronous and free of subprocess calls. Environment
//! provisioning lives in `scriptlite-env`; the save orchestration lives in
//! `scriptlite-commands`.

pub mod config;
pub mod observability;
pub mod outcome;
pub mod script;
