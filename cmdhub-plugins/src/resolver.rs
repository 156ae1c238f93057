//! Package source resolver — turns the configured path list into command groups.
//!
//! Discovery is lenient: a directory that cannot be loaded is reported as
//! [`Discovery::Skipped`] and left out of the registry, so one broken package
//! never hides the others.

use crate::{PackageError, PackageManifest, PackageValidator};
use cmdhub_core::config::split_package_paths;
use cmdhub_core::{CommandGroup, PackageSource};
use std::path::{Path, PathBuf};

/// Outcome of loading one package directory.
#[derive(Debug)]
pub enum Discovery {
    Found(CommandGroup),
    Skipped { path: PathBuf, reason: PackageError },
}

impl Discovery {
    pub fn into_group(self) -> Option<CommandGroup> {
        match self {
            Discovery::Found(group) => Some(group),
            Discovery::Skipped { .. } => None,
        }
    }
}

/// Resolves package directories from a platform path list.
pub struct PackageResolver {
    path_list: String,
    validator: PackageValidator,
}

impl PackageResolver {
    /// Create a resolver for a path list such as `packages.paths`.
    pub fn new(path_list: impl Into<String>) -> Self {
        Self {
            path_list: path_list.into(),
            validator: PackageValidator::new(),
        }
    }

    pub fn with_validator(mut self, validator: PackageValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Directories named by the path list, in order.
    pub fn directories(&self) -> Vec<PathBuf> {
        split_package_paths(&self.path_list)
    }

    /// Try every directory in order. An empty path list touches nothing.
    pub fn resolve(&self) -> Vec<Discovery> {
        self.directories()
            .into_iter()
            .map(|dir| match load_package_with(&dir, &self.validator) {
                Ok(group) => Discovery::Found(group),
                Err(reason) => {
                    tracing::debug!(path = %dir.display(), error = %reason, "Skipping package");
                    Discovery::Skipped { path: dir, reason }
                }
            })
            .collect()
    }
}

impl PackageSource for PackageResolver {
    fn groups(&self) -> Vec<CommandGroup> {
        self.resolve()
            .into_iter()
            .filter_map(Discovery::into_group)
            .collect()
    }
}

/// Load a single package directory with the default validator.
pub fn load_package(dir: &Path) -> Result<CommandGroup, PackageError> {
    load_package_with(dir, &PackageValidator::new())
}

/// Load a single package directory, checking it with `validator`.
pub fn load_package_with(
    dir: &Path,
    validator: &PackageValidator,
) -> Result<CommandGroup, PackageError> {
    let manifest = PackageManifest::read(dir)?;

    let validation = validator.validate(&manifest);
    for warning in &validation.warnings {
        tracing::debug!(path = %dir.display(), "{}", warning);
    }
    if !validation.is_valid {
        return Err(PackageError::Invalid(validation.errors));
    }

    let name = package_name(dir);
    Ok(CommandGroup::package(name, dir, manifest.commands))
}

/// Package name: the directory's file name.
fn package_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}
