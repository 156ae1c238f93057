//! Package updates.
//!
//! The registry only cares that packages changed; how a package is brought up
//! to date is behind [`PackageUpdater`].

use cmdhub_core::CommandGroup;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Errors from updating a package directory.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("Package has no directory: {0}")]
    NotAPackage(String),
    #[error("Failed to run {program} in {path}: {source}")]
    Spawn {
        program: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Update of {path} failed with {status}")]
    Failed { path: PathBuf, status: String },
}

/// Brings one package up to date in place.
pub trait PackageUpdater {
    fn update(&self, group: &CommandGroup) -> Result<(), UpdateError>;
}

/// Updates packages that are git checkouts with a fast-forward pull.
pub struct GitUpdater {
    program: String,
}

impl GitUpdater {
    pub fn new() -> Self {
        Self {
            program: "git".into(),
        }
    }

    fn pull(&self, dir: &Path) -> Result<(), UpdateError> {
        tracing::info!(path = %dir.display(), "Updating package");
        let status = Command::new(&self.program)
            .arg("-C")
            .arg(dir)
            .args(["pull", "--ff-only", "--quiet"])
            .status()
            .map_err(|source| UpdateError::Spawn {
                program: self.program.clone(),
                path: dir.to_path_buf(),
                source,
            })?;
        if !status.success() {
            return Err(UpdateError::Failed {
                path: dir.to_path_buf(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for GitUpdater {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageUpdater for GitUpdater {
    fn update(&self, group: &CommandGroup) -> Result<(), UpdateError> {
        let dir = group
            .package_path()
            .ok_or_else(|| UpdateError::NotAPackage(group.origin.to_string()))?;
        self.pull(dir)
    }
}
