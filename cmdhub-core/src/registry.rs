//! Command registry snapshots and the builder that assembles them.
//!
//! A [`Snapshot`] is the ordered list of command groups known at one point in
//! time: builtins first, then discovered packages in source order. Snapshots
//! are immutable values; rebuilding produces a new one.

use crate::builtin::builtin_groups;
use crate::command::{Command, CommandGroup};
use crate::error::CommandError;
use crate::upgrade::UpgradeSignal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Supplies command groups discovered outside the builtin table.
///
/// Implementations absorb their own failures: a source that cannot load a
/// package simply does not return it.
pub trait PackageSource {
    fn groups(&self) -> Vec<CommandGroup>;
}

/// A source with no packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPackages;

impl PackageSource for NoPackages {
    fn groups(&self) -> Vec<CommandGroup> {
        Vec::new()
    }
}

impl PackageSource for Vec<CommandGroup> {
    fn groups(&self) -> Vec<CommandGroup> {
        self.clone()
    }
}

/// The full ordered set of command groups at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    groups: Vec<CommandGroup>,
}

impl Snapshot {
    /// An empty snapshot, e.g. the state before a first run.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_groups(groups: Vec<CommandGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[CommandGroup] {
        &self.groups
    }

    /// All commands, group order then declaration order. Duplicates are kept.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.groups.iter().flat_map(|g| g.commands.iter())
    }

    /// Canonical names in snapshot order, duplicates included.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands().map(|c| c.name.as_str())
    }

    /// Number of commands (not groups).
    pub fn len(&self) -> usize {
        self.commands().count()
    }

    pub fn is_empty(&self) -> bool {
        self.commands().next().is_none()
    }

    /// Resolve a name or alias to the first command that answers to it.
    ///
    /// Lookup is first-wins, so builtins shadow package commands of the same
    /// name.
    pub fn find(&self, name: &str) -> Option<(&CommandGroup, &Command)> {
        self.groups
            .iter()
            .find_map(|g| g.commands.iter().find(|c| c.matches(name)).map(|c| (g, c)))
    }

    /// Like [`Snapshot::find`], but restricted to package groups.
    pub fn find_package(&self, name: &str) -> Result<&CommandGroup, CommandError> {
        match self.find(name) {
            Some((group, _)) if group.is_builtin() => Err(CommandError::Builtin {
                name: name.to_string(),
                operation: "changed by package operations".into(),
            }),
            Some((group, _)) => Ok(group),
            None => Err(CommandError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Canonical names that appear more than once, in first-seen order.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let mut reported = BTreeSet::new();
        let mut duplicates = Vec::new();
        for name in self.names() {
            if !seen.insert(name) && reported.insert(name) {
                duplicates.push(name);
            }
        }
        duplicates
    }
}

/// Composes the builtin table with discovered packages.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    upgrade: Option<UpgradeSignal>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include the `upgrade` builtin.
    pub fn with_upgrade(mut self, signal: Option<UpgradeSignal>) -> Self {
        self.upgrade = signal;
        self
    }

    /// Build a fresh snapshot: builtins first, then `source` groups in order.
    ///
    /// Names are not deduplicated. Collisions are logged and both commands are
    /// kept; [`Snapshot::find`] resolves to the first.
    pub fn build(&self, source: &dyn PackageSource) -> Snapshot {
        let mut groups = builtin_groups(self.upgrade.as_ref());
        let builtin_count = groups.len();
        groups.extend(source.groups());

        let snapshot = Snapshot::from_groups(groups);
        for name in snapshot.duplicate_names() {
            tracing::warn!(command = name, "Command name defined more than once, first definition wins");
        }
        tracing::debug!(
            builtin_groups = builtin_count,
            package_groups = snapshot.groups().len() - builtin_count,
            commands = snapshot.len(),
            "Built command registry"
        );
        snapshot
    }
}
