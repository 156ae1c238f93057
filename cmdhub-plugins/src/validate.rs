//! Package validation.
//!
//! Checks a parsed descriptor before its commands are allowed into the
//! registry.

use crate::PackageManifest;
use cmdhub_core::CURRENT_VERSION;
use std::collections::BTreeSet;

/// Result of validating a package descriptor.
#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Validates package descriptors.
pub struct PackageValidator {
    /// Command names packages may not define.
    blocked_names: Vec<String>,
    /// Version the `cmdhub` requirement is checked against.
    tool_version: String,
}

impl PackageValidator {
    /// Create a validator for the running tool version.
    pub fn new() -> Self {
        Self {
            blocked_names: Vec::new(),
            tool_version: CURRENT_VERSION.to_string(),
        }
    }

    /// Reject packages defining a command with this name.
    pub fn block_name(&mut self, name: impl Into<String>) {
        self.blocked_names.push(name.into());
    }

    /// Reject every name in `names`, e.g. the configured `packages.blocked`.
    pub fn with_blocked_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Check requirements against another tool version.
    pub fn with_tool_version(mut self, version: impl Into<String>) -> Self {
        self.tool_version = version.into();
        self
    }

    /// Validate a package descriptor.
    pub fn validate(&self, manifest: &PackageManifest) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if manifest.commands.is_empty() {
            errors.push("Package defines no commands".into());
        }

        let mut seen = BTreeSet::new();
        for cmd in &manifest.commands {
            if let Some(problem) = invalid_name(&cmd.name) {
                errors.push(format!("Command name '{}' {}", cmd.name, problem));
            }
            if self.blocked_names.contains(&cmd.name) {
                errors.push(format!("Command '{}' is blocked", cmd.name));
            }
            for name in std::iter::once(&cmd.name).chain(&cmd.aliases) {
                if !seen.insert(name.as_str()) {
                    errors.push(format!("Name '{name}' is defined more than once"));
                }
            }
            for alias in &cmd.aliases {
                if let Some(problem) = invalid_name(alias) {
                    errors.push(format!("Alias '{alias}' of '{}' {}", cmd.name, problem));
                }
            }
            if cmd.description.trim().is_empty() {
                warnings.push(format!("Command '{}' has no description", cmd.name));
            }
        }

        if let Some(required) = manifest.min_tool_version() {
            if !is_version_compatible(required, &self.tool_version) {
                errors.push(format!(
                    "Package requires cmdhub >= {} (current: {})",
                    required, self.tool_version
                ));
            }
        }

        let is_valid = errors.is_empty();
        ValidationResult {
            is_valid,
            warnings,
            errors,
        }
    }
}

impl Default for PackageValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_name(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("cannot be empty")
    } else if name.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\') {
        Some("contains whitespace or a path separator")
    } else if name.starts_with('-') {
        Some("cannot start with '-'")
    } else {
        None
    }
}

/// Returns true if `current >= required`.
fn is_version_compatible(required: &str, current: &str) -> bool {
    let required = required.trim().trim_start_matches('v');
    if let (Ok(req), Ok(cur)) = (
        semver::Version::parse(required),
        semver::Version::parse(current),
    ) {
        return cur >= req;
    }

    let req_parts: Vec<u32> = required.split('.').filter_map(|p| p.parse().ok()).collect();
    let cur_parts: Vec<u32> = current.split('.').filter_map(|p| p.parse().ok()).collect();

    for i in 0..3 {
        let req = req_parts.get(i).copied().unwrap_or(0);
        let cur = cur_parts.get(i).copied().unwrap_or(0);
        if cur != req {
            return cur > req;
        }
    }
    true
}
