//! `serve`: JSON HTTP API

use crate::cli::Commands;
use crate::command_registry::CommandRegistry;

pub fn register(reg: &mut CommandRegistry) {
    reg.register(|cmd| {
        if let Commands::Serve { listen } = cmd {
            Some(scriptlite_commands::gateway::cmd_serve(listen.as_deref()))
        } else {
            None
        }
    });
}
