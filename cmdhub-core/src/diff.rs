//! Presence diff between two registry snapshots.
//!
//! Only canonical names are compared. A command whose description, flags or
//! aliases changed but whose name did not is reported as unchanged.

use crate::registry::Snapshot;
use serde::Serialize;
use std::collections::BTreeSet;

/// Which classification set a name landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    Unchanged,
    Added,
    Removed,
}

/// The three disjoint classification sets produced by [`diff`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryDiff {
    unchanged: BTreeSet<String>,
    added: BTreeSet<String>,
    removed: BTreeSet<String>,
}

impl RegistryDiff {
    /// Names present in both snapshots.
    pub fn unchanged(&self) -> &BTreeSet<String> {
        &self.unchanged
    }

    /// Names only in the new snapshot.
    pub fn added(&self) -> &BTreeSet<String> {
        &self.added
    }

    /// Names only in the old snapshot.
    pub fn removed(&self) -> &BTreeSet<String> {
        &self.removed
    }

    /// Look up the classification of a canonical name.
    pub fn classify(&self, name: &str) -> Option<Change> {
        if self.unchanged.contains(name) {
            Some(Change::Unchanged)
        } else if self.added.contains(name) {
            Some(Change::Added)
        } else if self.removed.contains(name) {
            Some(Change::Removed)
        } else {
            None
        }
    }

    /// Whether anything was added or removed.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Classify every command name of `old` and `new`.
///
/// Names in `new` are unchanged if `old` has them and added otherwise; names
/// in `old` missing from `new` are removed. Comparison is exact and
/// case-sensitive. Repeated names are idempotent set insertions.
pub fn diff(old: &Snapshot, new: &Snapshot) -> RegistryDiff {
    let old_names: Vec<&str> = old.names().collect();
    let new_names: Vec<&str> = new.names().collect();

    let mut result = RegistryDiff::default();

    for name in &new_names {
        if old_names.contains(name) {
            result.unchanged.insert(name.to_string());
        } else {
            result.added.insert(name.to_string());
        }
    }

    for name in &old_names {
        if !new_names.contains(name) {
            result.removed.insert(name.to_string());
        }
    }

    tracing::debug!(
        unchanged = result.unchanged.len(),
        added = result.added.len(),
        removed = result.removed.len(),
        "Computed registry diff"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, CommandGroup, FlagDef};

    fn snapshot(names: &[&str]) -> Snapshot {
        Snapshot::from_groups(vec![CommandGroup::package(
            "pkg",
            "/pkgs/pkg",
            names.iter().map(|n| Command::new(*n)).collect(),
        )])
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_diff_mixed_changes() {
        let old = snapshot(&["help", "list", "install"]);
        let new = snapshot(&["help", "list", "uninstall"]);
        let d = diff(&old, &new);
        assert_eq!(d.unchanged(), &set(&["help", "list"]));
        assert_eq!(d.added(), &set(&["uninstall"]));
        assert_eq!(d.removed(), &set(&["install"]));
        assert!(d.has_changes());
    }

    #[test]
    fn test_diff_first_run() {
        let new = snapshot(&["help", "list"]);
        let d = diff(&Snapshot::empty(), &new);
        assert_eq!(d.added(), &set(&["help", "list"]));
        assert!(d.unchanged().is_empty());
        assert!(d.removed().is_empty());
    }

    #[test]
    fn test_diff_same_snapshot() {
        let s = snapshot(&["a", "b"]);
        let d = diff(&s, &s);
        assert_eq!(d.unchanged(), &set(&["a", "b"]));
        assert!(!d.has_changes());
    }

    #[test]
    fn test_diff_ignores_metadata() {
        let old = Snapshot::from_groups(vec![CommandGroup::package(
            "pkg",
            "/a",
            vec![Command::new("echo").with_description("old")],
        )]);
        let new = Snapshot::from_groups(vec![CommandGroup::package(
            "pkg",
            "/b",
            vec![Command::new("echo")
                .with_description("new")
                .with_aliases(&["e"])
                .with_flag(FlagDef::new("loud", "Shout"))],
        )]);
        let d = diff(&old, &new);
        assert_eq!(d.classify("echo"), Some(Change::Unchanged));
    }

    #[test]
    fn test_diff_aliases_are_not_keys() {
        let old = snapshot(&[]);
        let new = Snapshot::from_groups(vec![CommandGroup::package(
            "pkg",
            "/a",
            vec![Command::new("install").with_aliases(&["get"])],
        )]);
        let d = diff(&old, &new);
        assert_eq!(d.classify("install"), Some(Change::Added));
        assert_eq!(d.classify("get"), None);
    }

    #[test]
    fn test_diff_is_case_sensitive() {
        let d = diff(&snapshot(&["Help"]), &snapshot(&["help"]));
        assert_eq!(d.added(), &set(&["help"]));
        assert_eq!(d.removed(), &set(&["Help"]));
    }

    #[test]
    fn test_diff_duplicate_names() {
        let old = snapshot(&["echo"]);
        let new = snapshot(&["echo", "echo", "new", "new"]);
        let d = diff(&old, &new);
        assert_eq!(d.unchanged(), &set(&["echo"]));
        assert_eq!(d.added(), &set(&["new"]));
    }

    #[test]
    fn test_diff_both_empty() {
        let d = diff(&Snapshot::empty(), &Snapshot::empty());
        assert_eq!(d, RegistryDiff::default());
    }
}
