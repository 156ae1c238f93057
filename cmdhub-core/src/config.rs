//! Configuration for cmdhub.
//!
//! Settings are layered with `figment`: defaults, the user config file, an
//! explicit `--config` file, then `CMDHUB_`-prefixed environment variables
//! (`CMDHUB_PACKAGES__PATHS`, `CMDHUB_UPGRADE__ENABLED`, ...).
//!
//! The `config` builtin edits the TOML file directly through [`ConfigStore`],
//! which treats it as a free-form `section.key = value` store.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::upgrade::UpgradeConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CmdhubConfig {
    #[serde(default)]
    pub packages: PackagesConfig,
    #[serde(default)]
    pub upgrade: UpgradeConfig,
}

/// Where installed packages live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackagesConfig {
    /// Package directories, joined with the platform path separator.
    #[serde(default)]
    pub paths: String,
    /// Command names packages may not define.
    #[serde(default)]
    pub blocked: Vec<String>,
}

/// Default user-level config file, e.g. `~/.config/cmdhub/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "cmdhub", "cmdhub")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration from all layers.
///
/// `explicit` replaces nothing; it is merged on top of the user file.
pub fn load_config(explicit: Option<&Path>) -> Result<CmdhubConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(CmdhubConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(path) = explicit {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("CMDHUB_").split("__"));

    figment.extract().map_err(Box::new)
}

/// Split a platform path list into directories, dropping empty entries.
pub fn split_package_paths(paths: &str) -> Vec<PathBuf> {
    if paths.trim().is_empty() {
        return Vec::new();
    }
    std::env::split_paths(paths)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

/// Join directories into a platform path list.
pub fn join_package_paths(paths: &[PathBuf]) -> Result<String, ConfigError> {
    let joined = std::env::join_paths(paths).map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })?;
    Ok(joined.to_string_lossy().into_owned())
}

const PACKAGE_PATHS_SETTING: &str = "packages.paths";

/// Free-form view of the TOML config file used by the `config` builtin.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    table: toml::Table,
}

impl ConfigStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let table = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            content.parse::<toml::Table>().map_err(|e| ConfigError::ParseError {
                message: format!("{}: {e}", path.display()),
            })?
        } else {
            toml::Table::new()
        };
        Ok(Self { path, table })
    }

    /// Open the user-level store.
    pub fn open_user() -> Result<Self, ConfigError> {
        Self::open(user_config_path().ok_or(ConfigError::NoConfigDir)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read `section.key`.
    pub fn get(&self, setting: &str) -> Result<Option<String>, ConfigError> {
        let (section, key) = parse_setting(setting)?;
        Ok(self
            .table
            .get(section)
            .and_then(|s| s.as_table())
            .and_then(|s| s.get(key))
            .map(display_value))
    }

    /// Set `section.key`. `true`/`false` are stored as booleans, anything else
    /// as a string.
    ///
    /// Unknown settings are accepted as-is. A value that would stop the file
    /// from loading as [`CmdhubConfig`] is rejected and the store is left
    /// unchanged.
    pub fn set(&mut self, setting: &str, value: &str) -> Result<(), ConfigError> {
        let (section, key) = parse_setting(setting)?;
        let value = match value {
            "true" => toml::Value::Boolean(true),
            "false" => toml::Value::Boolean(false),
            other => toml::Value::String(other.to_string()),
        };

        let mut table = self.table.clone();
        let section_table = table
            .entry(section.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        if !section_table.is_table() {
            *section_table = toml::Value::Table(toml::Table::new());
        }
        if let Some(t) = section_table.as_table_mut() {
            t.insert(key.to_string(), value);
        }

        toml::Value::Table(table.clone())
            .try_into::<CmdhubConfig>()
            .map_err(|e| ConfigError::InvalidValue {
                setting: setting.to_string(),
                message: e.message().to_string(),
            })?;
        self.table = table;
        Ok(())
    }

    /// Remove `section.key`. Returns whether it existed. Empty sections are
    /// dropped.
    pub fn unset(&mut self, setting: &str) -> Result<bool, ConfigError> {
        let (section, key) = parse_setting(setting)?;
        let Some(section_table) = self.table.get_mut(section).and_then(|s| s.as_table_mut())
        else {
            return Ok(false);
        };
        let removed = section_table.remove(key).is_some();
        if section_table.is_empty() {
            self.table.remove(section);
        }
        Ok(removed)
    }

    /// All settings as `(section.key, value)`, optionally limited to one
    /// section. Sorted by section, then key.
    pub fn list(&self, section: Option<&str>) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        for (name, value) in &self.table {
            if section.is_some_and(|s| s != name.as_str()) {
                continue;
            }
            if let Some(t) = value.as_table() {
                for (key, v) in t {
                    entries.push((format!("{name}.{key}"), display_value(v)));
                }
            }
        }
        entries
    }

    /// Current package directories.
    pub fn package_paths(&self) -> Vec<PathBuf> {
        self.get(PACKAGE_PATHS_SETTING)
            .ok()
            .flatten()
            .map(|p| split_package_paths(&p))
            .unwrap_or_default()
    }

    /// Append a package directory. Returns false if it was already listed.
    pub fn add_package_path(&mut self, dir: &Path) -> Result<bool, ConfigError> {
        let mut paths = self.package_paths();
        if paths.iter().any(|p| p == dir) {
            return Ok(false);
        }
        paths.push(dir.to_path_buf());
        let joined = join_package_paths(&paths)?;
        self.set(PACKAGE_PATHS_SETTING, &joined)?;
        Ok(true)
    }

    /// Remove a package directory. Returns false if it was not listed.
    pub fn remove_package_path(&mut self, dir: &Path) -> Result<bool, ConfigError> {
        let mut paths = self.package_paths();
        let before = paths.len();
        paths.retain(|p| p != dir);
        if paths.len() == before {
            return Ok(false);
        }
        let joined = join_package_paths(&paths)?;
        self.set(PACKAGE_PATHS_SETTING, &joined)?;
        Ok(true)
    }

    /// Write the store back to disk, creating parent directories.
    pub fn save(&self) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = toml::to_string_pretty(&self.table).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, content).map_err(write_err)?;
        tracing::info!(path = %self.path.display(), "Saved configuration");
        Ok(())
    }
}

fn parse_setting(setting: &str) -> Result<(&str, &str), ConfigError> {
    match setting.split_once('.') {
        Some((section, key)) if !section.is_empty() && !key.is_empty() => Ok((section, key)),
        _ => Err(ConfigError::InvalidSetting {
            setting: setting.to_string(),
        }),
    }
}

fn display_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CmdhubConfig::default();
        assert!(config.packages.paths.is_empty());
        assert!(config.upgrade.enabled);
    }

    #[test]
    fn test_load_config_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[packages]\npaths = \"/opt/a\"\n[upgrade]\nenabled = false\n",
        )
        .unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.packages.paths, "/opt/a");
        assert!(!config.upgrade.enabled);
    }

    #[test]
    fn test_split_package_paths_empty() {
        assert!(split_package_paths("").is_empty());
        assert!(split_package_paths("   ").is_empty());
    }

    #[test]
    fn test_split_and_join_roundtrip() {
        let paths = vec![PathBuf::from("/opt/a"), PathBuf::from("/opt/b")];
        let joined = join_package_paths(&paths).unwrap();
        assert_eq!(split_package_paths(&joined), paths);
    }

    #[test]
    fn test_store_set_get_unset() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = ConfigStore::open(dir.path().join("config.toml")).unwrap();
        assert_eq!(store.get("cli.last-upgrade-check").unwrap(), None);

        store.set("cli.last-upgrade-check", "ignore").unwrap();
        store.set("upgrade.enabled", "false").unwrap();
        assert_eq!(
            store.get("cli.last-upgrade-check").unwrap().as_deref(),
            Some("ignore")
        );
        assert_eq!(store.get("upgrade.enabled").unwrap().as_deref(), Some("false"));

        assert!(store.unset("cli.last-upgrade-check").unwrap());
        assert!(!store.unset("cli.last-upgrade-check").unwrap());
        assert_eq!(store.list(Some("cli")), Vec::<(String, String)>::new());
    }

    #[test]
    fn test_store_invalid_setting() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = ConfigStore::open(dir.path().join("config.toml")).unwrap();
        assert!(matches!(
            store.get("paths"),
            Err(ConfigError::InvalidSetting { .. })
        ));
        assert!(matches!(
            store.get(".paths"),
            Err(ConfigError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_store_list_and_save() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut store = ConfigStore::open(&path).unwrap();
        store.set("packages.paths", "/opt/a").unwrap();
        store.set("upgrade.latest_version", "1.0.0").unwrap();
        store.save().unwrap();

        let reopened = ConfigStore::open(&path).unwrap();
        assert_eq!(
            reopened.list(None),
            vec![
                ("packages.paths".to_string(), "/opt/a".to_string()),
                ("upgrade.latest_version".to_string(), "1.0.0".to_string()),
            ]
        );
        assert_eq!(reopened.list(Some("upgrade")).len(), 1);

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.upgrade.latest_version, "1.0.0");
    }

    #[test]
    fn test_store_package_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = ConfigStore::open(dir.path().join("config.toml")).unwrap();
        assert!(store.add_package_path(Path::new("/opt/a")).unwrap());
        assert!(store.add_package_path(Path::new("/opt/b")).unwrap());
        assert!(!store.add_package_path(Path::new("/opt/a")).unwrap());
        assert_eq!(
            store.package_paths(),
            vec![PathBuf::from("/opt/a"), PathBuf::from("/opt/b")]
        );

        assert!(store.remove_package_path(Path::new("/opt/a")).unwrap());
        assert!(!store.remove_package_path(Path::new("/opt/zzz")).unwrap());
        assert_eq!(store.package_paths(), vec![PathBuf::from("/opt/b")]);
    }

    #[test]
    fn test_store_set_rejects_values_that_break_loading() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut store = ConfigStore::open(&path).unwrap();
        store.set("packages.paths", "/opt/a").unwrap();

        assert!(matches!(
            store.set("upgrade.enabled", "yes"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            store.set("packages.paths", "true"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            store.set("upgrade.last_check", "yesterday"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(store.get("upgrade.enabled").unwrap(), None);
        assert_eq!(store.get("packages.paths").unwrap().as_deref(), Some("/opt/a"));

        store.set("upgrade.enabled", "false").unwrap();
        store.set("upgrade.last_check", "2026-10-01T12:00:00Z").unwrap();
        store.set("cli.anything", "yes").unwrap();
        store.save().unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert!(!config.upgrade.enabled);
        assert!(config.upgrade.last_check.is_some());
        assert_eq!(config.packages.paths, "/opt/a");
    }

    #[test]
    fn test_load_config_blocked_names() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[packages]\nblocked = [\"deploy\", \"purge\"]\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.packages.blocked, vec!["deploy", "purge"]);
        assert!(CmdhubConfig::default().packages.blocked.is_empty());
    }

    #[test]
    fn test_store_open_unreadable_path() {
        let dir = tempfile::TempDir::new().unwrap();
        // A directory exists but cannot be read as a file.
        assert!(matches!(
            ConfigStore::open(dir.path()),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_store_rejects_malformed_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        assert!(matches!(
            ConfigStore::open(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
