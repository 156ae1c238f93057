//! Command descriptors and the groups that own them.
//!
//! A [`CommandGroup`] is the unit the registry works with: one origin (the
//! builtin table or one package directory), the commands it provides, and
//! the handler that runs them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// An option accepted by a command. Opaque to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagDef {
    pub name: String,
    pub usage: String,
}

impl FlagDef {
    pub fn new(name: impl Into<String>, usage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            usage: usage.into(),
        }
    }
}

/// A nested command for commands that dispatch further, e.g. `config get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcommandDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub arguments: String,
}

impl SubcommandDef {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            arguments: arguments.into(),
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Whether `name` is this subcommand's name or one of its aliases.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }
}

/// Metadata for a single invocable command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Canonical name. Only this field takes part in registry diffs.
    pub name: String,
    /// Alternate names, in declaration order.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub usage: String,
    #[serde(default)]
    pub arguments: String,
    /// Executable reference for package commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<String>,
    #[serde(default, rename = "auto-complete")]
    pub auto_complete: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub docs: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<FlagDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<SubcommandDef>,
}

impl Command {
    /// Create a command with only a name set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = arguments.into();
        self
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_flag(mut self, flag: FlagDef) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = docs.into();
        self
    }

    pub fn with_subcommand(mut self, sub: SubcommandDef) -> Self {
        self.subcommands.push(sub);
        self
    }

    /// Whether `name` is this command's canonical name or one of its aliases.
    ///
    /// Comparison is exact and case-sensitive.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    /// Find a subcommand by name or alias.
    pub fn subcommand(&self, name: &str) -> Option<&SubcommandDef> {
        self.subcommands.iter().find(|s| s.matches(name))
    }
}

/// Handlers for the commands shipped with the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinAction {
    Help,
    List,
    Config,
    Install,
    Search,
    Uninstall,
    Update,
    Upgrade,
}

/// How the commands of a group are invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "handler")]
pub enum Action {
    /// Handled in-process.
    Builtin(BuiltinAction),
    /// Runs the command's executable from its package directory.
    External,
}

/// Where a command group came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum Origin {
    Builtin,
    Package { name: String, path: PathBuf },
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Builtin => write!(f, "builtin"),
            Origin::Package { name, .. } => write!(f, "package {name}"),
        }
    }
}

/// A named origin owning an ordered list of commands plus their handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandGroup {
    pub origin: Origin,
    pub commands: Vec<Command>,
    pub action: Action,
}

impl CommandGroup {
    /// A builtin group holding a single command.
    pub fn builtin(command: Command, action: BuiltinAction) -> Self {
        Self {
            origin: Origin::Builtin,
            commands: vec![command],
            action: Action::Builtin(action),
        }
    }

    /// A group discovered in a package directory.
    pub fn package(name: impl Into<String>, path: impl Into<PathBuf>, commands: Vec<Command>) -> Self {
        Self {
            origin: Origin::Package {
                name: name.into(),
                path: path.into(),
            },
            commands,
            action: Action::External,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.origin, Origin::Builtin)
    }

    /// Package directory, if this group came from one.
    pub fn package_path(&self) -> Option<&std::path::Path> {
        match &self.origin {
            Origin::Package { path, .. } => Some(path),
            Origin::Builtin => None,
        }
    }
}
