//! Script commands: Save, List, Show, Run, Versions

use crate::cli::Commands;
use crate::command_registry::CommandRegistry;

pub fn register(reg: &mut CommandRegistry) {
    reg.register(|cmd| {
        if let Commands::Save {
            name,
            file,
            content,
            python,
            force,
            json,
        } = cmd
        {
            Some(scriptlite_commands::script::cmd_save(
                name,
                file.as_deref(),
                content.as_deref(),
                python.as_deref(),
                *force,
                *json,
            ))
        } else {
            None
        }
    });

    reg.register(|cmd| {
        if let Commands::List { json } = cmd {
            Some(scriptlite_commands::script::cmd_list(*json))
        } else {
            None
        }
    });

    reg.register(|cmd| {
        if let Commands::Show { name, json } = cmd {
            Some(scriptlite_commands::script::cmd_show(name, *json))
        } else {
            None
        }
    });

    reg.register(|cmd| {
        if let Commands::Run {
            name,
            timeout,
            json,
            args,
        } = cmd
        {
            Some(
                scriptlite_commands::script::cmd_run(name, args, *timeout, *json).map(|code| {
                    if code != 0 {
                        std::process::exit(code);
                    }
                }),
            )
        } else {
            None
        }
    });

    reg.register(|cmd| {
        if let Commands::Versions { json } = cmd {
            Some(scriptlite_commands::versions::cmd_versions(*json))
        } else {
            None
        }
    });
}
