//! ScriptLite CLI library: argument parsing and command dispatch.

mod cli;
mod command_registry;
mod dispatch;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use command_registry::CommandRegistry;

/// Parse args, set up logging, run the selected command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    scriptlite_core::config::load_dotenv();
    scriptlite_core::observability::init_tracing();
    tracing::debug!(command = ?cli.command, "Dispatching");

    let mut reg = CommandRegistry::new();
    dispatch::register_all(&mut reg);
    reg.dispatch(&cli.command)
}
