//! Property-based tests for registry diffing using proptest.

use proptest::prelude::*;
use std::collections::BTreeSet;

use cmdhub_core::{Command, CommandGroup, NoPackages, RegistryBuilder, Snapshot, diff};

fn snapshot_of(groups: &[Vec<String>]) -> Snapshot {
    Snapshot::from_groups(
        groups
            .iter()
            .enumerate()
            .map(|(i, names)| {
                CommandGroup::package(
                    format!("pkg-{i}"),
                    format!("/pkgs/pkg-{i}"),
                    names.iter().map(Command::new).collect(),
                )
            })
            .collect(),
    )
}

fn name_set(snapshot: &Snapshot) -> BTreeSet<String> {
    snapshot.names().map(String::from).collect()
}

/// Small alphabet so old and new overlap often, with duplicates.
fn groups_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec("[a-e]{1,2}", 0..4), 0..4)
}

// --- Classification properties ---

proptest! {
    #[test]
    fn diff_is_total_and_disjoint(old in groups_strategy(), new in groups_strategy()) {
        let (old, new) = (snapshot_of(&old), snapshot_of(&new));
        let d = diff(&old, &new);

        for name in new.names() {
            let hits = [d.unchanged().contains(name), d.added().contains(name)];
            prop_assert_eq!(hits.iter().filter(|h| **h).count(), 1);
            prop_assert!(!d.removed().contains(name));
        }
        for name in old.names() {
            let hits = [d.unchanged().contains(name), d.removed().contains(name)];
            prop_assert_eq!(hits.iter().filter(|h| **h).count(), 1);
            prop_assert!(!d.added().contains(name));
        }
    }

    #[test]
    fn diff_unions_match_snapshots(old in groups_strategy(), new in groups_strategy()) {
        let (old, new) = (snapshot_of(&old), snapshot_of(&new));
        let d = diff(&old, &new);

        let new_side: BTreeSet<String> = d.unchanged().union(d.added()).cloned().collect();
        let old_side: BTreeSet<String> = d.unchanged().union(d.removed()).cloned().collect();
        prop_assert_eq!(new_side, name_set(&new));
        prop_assert_eq!(old_side, name_set(&old));
    }

    #[test]
    fn diff_with_itself_is_unchanged(groups in groups_strategy()) {
        let s = snapshot_of(&groups);
        let d = diff(&s, &s);
        prop_assert_eq!(d.unchanged(), &name_set(&s));
        prop_assert!(d.added().is_empty());
        prop_assert!(d.removed().is_empty());
    }

    #[test]
    fn diff_from_empty_adds_everything(groups in groups_strategy()) {
        let s = snapshot_of(&groups);
        let d = diff(&Snapshot::empty(), &s);
        prop_assert_eq!(d.added(), &name_set(&s));
        prop_assert!(d.unchanged().is_empty());
        prop_assert!(d.removed().is_empty());
    }

    #[test]
    fn diff_is_symmetric(old in groups_strategy(), new in groups_strategy()) {
        let (old, new) = (snapshot_of(&old), snapshot_of(&new));
        let forward = diff(&old, &new);
        let backward = diff(&new, &old);
        prop_assert_eq!(forward.removed(), backward.added());
        prop_assert_eq!(forward.added(), backward.removed());
        prop_assert_eq!(forward.unchanged(), backward.unchanged());
    }

    #[test]
    fn diff_ignores_descriptions(groups in groups_strategy(), description in ".{0,20}") {
        let old = snapshot_of(&groups);
        let new = Snapshot::from_groups(
            old.groups()
                .iter()
                .cloned()
                .map(|mut g| {
                    for c in &mut g.commands {
                        c.description = description.clone();
                    }
                    g
                })
                .collect(),
        );
        let d = diff(&old, &new);
        prop_assert!(!d.has_changes());
    }
}

// --- Concrete scenarios ---

#[test]
fn first_run_adds_all_builtins() {
    let current = RegistryBuilder::new().build(&NoPackages);
    let d = diff(&Snapshot::empty(), &current);
    let expected: BTreeSet<String> = [
        "help", "list", "config", "install", "search", "uninstall", "update",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(d.added(), &expected);
    assert!(d.unchanged().is_empty());
    assert!(d.removed().is_empty());
}

#[test]
fn package_added_between_snapshots() {
    let before = RegistryBuilder::new().build(&NoPackages);
    let after = RegistryBuilder::new().build(&vec![CommandGroup::package(
        "cli-echo",
        "/pkgs/cli-echo",
        vec![Command::new("echo").with_aliases(&["e"])],
    )]);
    let d = diff(&before, &after);
    assert_eq!(d.added().iter().collect::<Vec<_>>(), vec!["echo"]);
    assert_eq!(d.unchanged().len(), 7);
    assert!(d.removed().is_empty());
}
