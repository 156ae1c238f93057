//! The `cli.json` package descriptor.

use cmdhub_core::Command;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::PackageError;

/// File name of the descriptor inside a package directory.
pub const MANIFEST_FILE: &str = "cli.json";

/// Contents of a package's `cli.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Runtime requirements, e.g. `{"go": "1.8.0"}`. A `cmdhub` entry is the
    /// minimum tool version the package needs.
    #[serde(default)]
    pub requirements: BTreeMap<String, String>,
    pub commands: Vec<Command>,
}

impl PackageManifest {
    /// Parse a descriptor from JSON text.
    pub fn parse(json: &str, path: &Path) -> Result<Self, PackageError> {
        serde_json::from_str(json).map_err(|source| PackageError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read `<dir>/cli.json`.
    pub fn read(dir: &Path) -> Result<Self, PackageError> {
        let path = dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(PackageError::NotFound(path));
        }
        let content = std::fs::read_to_string(&path).map_err(|source| PackageError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&content, &path)
    }

    /// Minimum cmdhub version required, if declared.
    pub fn min_tool_version(&self) -> Option<&str> {
        self.requirements.get("cmdhub").map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let json = r#"{
            "requirements": { "go": "1.8.0" },
            "commands": [
                { "name": "property", "aliases": ["prop"], "version": "0.3.1",
                  "description": "Manage properties", "bin": "https://example.com/property" },
                { "name": "purge", "description": "Purge content", "unknown-key": 1 }
            ]
        }"#;
        let manifest = PackageManifest::parse(json, Path::new("cli.json")).unwrap();
        assert_eq!(manifest.commands.len(), 2);
        assert_eq!(manifest.commands[0].aliases, vec!["prop"]);
        assert_eq!(manifest.requirements.get("go").map(String::as_str), Some("1.8.0"));
        assert!(manifest.min_tool_version().is_none());
    }

    #[test]
    fn test_parse_missing_commands() {
        let result = PackageManifest::parse(r#"{"requirements": {}}"#, Path::new("cli.json"));
        assert!(matches!(result, Err(PackageError::Parse { .. })));
    }

    #[test]
    fn test_read_missing_descriptor() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = PackageManifest::read(dir.path());
        assert!(matches!(result, Err(PackageError::NotFound(_))));
    }

    #[test]
    fn test_min_tool_version() {
        let json = r#"{"requirements": {"cmdhub": "0.2.0"}, "commands": []}"#;
        let manifest = PackageManifest::parse(json, Path::new("cli.json")).unwrap();
        assert_eq!(manifest.min_tool_version(), Some("0.2.0"));
    }
}
