//! Environment lifecycle for a script directory.
//!
//! Callers pass resolved `ScriptPaths`; this module talks to the tool ports
//! and owns the environment marker.

pub mod installer;
pub mod provisioner;
