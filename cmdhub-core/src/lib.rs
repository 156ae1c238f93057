//! # cmdhub Core
//!
//! Command registry for cmdhub. Merges the builtin command table with
//! commands discovered in installed packages, and diffs two registry
//! snapshots into unchanged, added, and removed command names.

pub mod builtin;
pub mod command;
pub mod config;
pub mod diff;
pub mod error;
pub mod registry;
pub mod upgrade;

// Re-export commonly used types at the crate root.
pub use builtin::builtin_groups;
pub use command::{Action, BuiltinAction, Command, CommandGroup, FlagDef, Origin, SubcommandDef};
pub use config::{CmdhubConfig, ConfigStore, load_config};
pub use diff::{Change, RegistryDiff, diff};
pub use error::{CommandError, ConfigError};
pub use registry::{NoPackages, PackageSource, RegistryBuilder, Snapshot};
pub use upgrade::{CURRENT_VERSION, UpgradeConfig, UpgradeSignal, upgrade_signal};
