//! Command registry: each dispatch module registers the handlers for its own
//! `Commands` variants, so adding a command never touches lib.rs.
//!
//! To add a command:
//! 1. add the variant to `Commands` in cli.rs
//! 2. call `reg.register(...)` from the matching dispatch module

use anyhow::Result;
use std::sync::Arc;

use crate::cli::Commands;

/// Returns `Some(result)` for the variants it handles, `None` otherwise.
pub type CommandHandler = Arc<dyn Fn(&Commands) -> Option<Result<()>> + Send + Sync>;

/// Tries handlers in registration order; the first `Some` wins.
pub struct CommandRegistry {
    handlers: Vec<CommandHandler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn register<F>(&mut self, f: F)
    where
        F: Fn(&Commands) -> Option<Result<()>> + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(f));
    }

    pub fn dispatch(&self, cmd: &Commands) -> Result<()> {
        for h in &self.handlers {
            if let Some(r) = h(cmd) {
                return r;
            }
        }
        anyhow::bail!("no handler registered for {:?}", cmd)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
