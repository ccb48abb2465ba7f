//! `config show` / `config set-root`

use crate::cli::{Commands, ConfigAction};
use crate::command_registry::CommandRegistry;

pub fn register(reg: &mut CommandRegistry) {
    reg.register(|cmd| {
        let Commands::Config { action } = cmd else {
            return None;
        };
        Some(match action {
            ConfigAction::Show { json } => scriptlite_commands::config::cmd_config_show(*json),
            ConfigAction::SetRoot { dir } => scriptlite_commands::config::cmd_config_set_root(dir),
        })
    });
}
