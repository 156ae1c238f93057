//! # cmdhub Plugins
//!
//! Discovers installed command packages. A package is a directory holding a
//! `cli.json` descriptor; each successfully loaded package becomes one
//! command group in the registry. Broken packages are skipped, never fatal.

pub mod manifest;
pub mod resolver;
pub mod validate;

use std::path::PathBuf;

pub use manifest::{MANIFEST_FILE, PackageManifest};
pub use resolver::{Discovery, PackageResolver, load_package, load_package_with};
pub use validate::{PackageValidator, ValidationResult};

/// Reasons a package directory could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("Package descriptor not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed package descriptor {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid package: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
