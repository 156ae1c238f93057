//! The fixed table of commands shipped with cmdhub.

use crate::command::{BuiltinAction, Command, CommandGroup, FlagDef, SubcommandDef};
use crate::upgrade::UpgradeSignal;

/// Build the builtin command groups.
///
/// Deterministic and free of I/O. The `upgrade` group is appended only when
/// an upgrade signal is supplied.
pub fn builtin_groups(upgrade: Option<&UpgradeSignal>) -> Vec<CommandGroup> {
    let mut groups = vec![
        CommandGroup::builtin(
            Command::new("help")
                .with_description("Displays help information")
                .with_arguments("[command] [sub-command]"),
            BuiltinAction::Help,
        ),
        CommandGroup::builtin(
            Command::new("list")
                .with_description("Displays available commands")
                .with_flag(FlagDef::new("json", "Print the command registry as JSON")),
            BuiltinAction::List,
        ),
        CommandGroup::builtin(
            Command::new("config")
                .with_description("Manage configuration")
                .with_arguments("<action> <setting> [value]")
                .with_subcommand(SubcommandDef::new("get", "<setting>"))
                .with_subcommand(SubcommandDef::new("set", "<setting> <value>"))
                .with_subcommand(SubcommandDef::new("list", "[section]"))
                .with_subcommand(SubcommandDef::new("unset", "<setting>").with_aliases(&["rm"])),
            BuiltinAction::Config,
        ),
        CommandGroup::builtin(
            Command::new("install")
                .with_description("Install packages from local package directories")
                .with_arguments("<package directory>...")
                .with_aliases(&["get"])
                .with_flag(FlagDef::new(
                    "force",
                    "Add the directory even if it does not contain a valid package",
                ))
                .with_docs(
                    "Examples:\n\n   cmdhub install ./cli-property\n   cmdhub install /opt/cmdhub/packages/cli-purge",
                ),
            BuiltinAction::Install,
        ),
        CommandGroup::builtin(
            Command::new("search")
                .with_description("Search installed commands by name, alias, or description")
                .with_arguments("<keyword>...")
                .with_docs("Examples:\n\n   cmdhub search property"),
            BuiltinAction::Search,
        ),
        CommandGroup::builtin(
            Command::new("uninstall")
                .with_description("Uninstall package containing <command>")
                .with_arguments("<command>..."),
            BuiltinAction::Uninstall,
        ),
        CommandGroup::builtin(
            Command::new("update")
                .with_description(
                    "Update one or more commands. If no command is specified, all commands are updated",
                )
                .with_arguments("[<command>...]")
                .with_flag(FlagDef::new(
                    "force",
                    "Continue updating remaining packages when one fails",
                )),
            BuiltinAction::Update,
        ),
    ];

    if let Some(signal) = upgrade {
        groups.push(CommandGroup::builtin(
            Command::new("upgrade").with_description(format!(
                "Upgrade cmdhub to the latest version ({})",
                signal.latest_version
            )),
            BuiltinAction::Upgrade,
        ));
    }

    groups
}
