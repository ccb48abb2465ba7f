//! Command dispatch: each module registers the handlers for its commands.

mod config;
mod script;
#[cfg(feature = "gateway")]
mod serve;

use crate::command_registry::CommandRegistry;

pub fn register_all(reg: &mut CommandRegistry) {
    script::register(reg);
    config::register(reg);
    #[cfg(feature = "gateway")]
    serve::register(reg);
}
