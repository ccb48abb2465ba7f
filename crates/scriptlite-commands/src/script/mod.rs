//! Script commands: save, list, show, run.

pub mod list;
pub mod run;
pub mod save;
pub mod show;

pub use list::cmd_list;
pub use run::cmd_run;
pub use save::cmd_save;
pub use show::cmd_show;
