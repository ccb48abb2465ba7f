use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ScriptLite - store Python scripts, each with its own uv environment
#[derive(Parser, Debug)]
#[command(name = "scriptlite")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the JSON HTTP API
    #[cfg(feature = "gateway")]
    Serve {
        /// Listen address (default: SCRIPTLITE_LISTEN or 0.0.0.0:5001)
        #[arg(long, short = 'l', value_name = "ADDR")]
        listen: Option<String>,
    },

    /// Save a script and provision its environment on first save
    Save {
        /// Script name; ".py" is appended when missing
        #[arg(value_name = "NAME")]
        name: String,

        /// Source file; "-" or neither this nor --content reads stdin
        #[arg(long, short = 'f', value_name = "PATH", conflicts_with = "content")]
        file: Option<PathBuf>,

        /// Script source given inline
        #[arg(long, short = 'c', value_name = "TEXT")]
        content: Option<String>,

        /// Python version for a new environment (default: SCRIPTLITE_DEFAULT_PYTHON or 3.12)
        #[arg(long = "python-version", short = 'p', value_name = "VERSION", alias = "python")]
        python: Option<String>,

        /// Replace an existing script
        #[arg(long, alias = "overwrite")]
        force: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored scripts
    #[command(name = "list", alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a stored script
    Show {
        #[arg(value_name = "NAME")]
        name: String,

        /// Output metadata and content as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a stored script in its environment
    Run {
        #[arg(value_name = "NAME")]
        name: String,

        /// Kill the script after this many seconds (default: SCRIPTLITE_RUN_TIMEOUT_SECS or 60)
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Output the run report as JSON
        #[arg(long)]
        json: bool,

        /// Arguments passed to the script
        #[arg(last = true, value_name = "ARGS")]
        args: Vec<String>,
    },

    /// List Python versions available for new environments
    Versions {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Persist the script root directory
    #[command(name = "set-root")]
    SetRoot {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
}
