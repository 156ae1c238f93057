//! Upgrade-path signal.
//!
//! Whether an `upgrade` builtin is offered depends on a version recorded by an
//! external upgrade checker. Nothing here touches the network.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version of the running binary.
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Upgrade settings, stored under `[upgrade]` in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeConfig {
    /// Whether the `upgrade` command may be offered at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Latest version reported by the last upgrade check, if any.
    #[serde(default)]
    pub latest_version: String,
    /// When that check ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_check: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            latest_version: String::new(),
            last_check: None,
        }
    }
}

/// Signals that a newer release is available, enabling the `upgrade` builtin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeSignal {
    pub current_version: String,
    pub latest_version: String,
}

/// Derive the upgrade signal from configuration.
///
/// Returns `None` when upgrades are disabled, no version was recorded, or the
/// recorded version is not newer than `current`.
pub fn upgrade_signal(config: &UpgradeConfig, current: &str) -> Option<UpgradeSignal> {
    if !config.enabled {
        return None;
    }
    let latest = config.latest_version.trim().trim_start_matches('v');
    if latest.is_empty() || !is_newer_version(latest, current) {
        return None;
    }
    tracing::debug!(current, latest, "Upgrade available");
    Some(UpgradeSignal {
        current_version: current.to_string(),
        latest_version: latest.to_string(),
    })
}

/// Returns true if `latest` is newer than `current`.
///
/// Uses semver ordering when both parse; otherwise compares the first three
/// numeric components, treating missing ones as zero.
pub fn is_newer_version(latest: &str, current: &str) -> bool {
    if let (Ok(l), Ok(c)) = (
        semver::Version::parse(latest),
        semver::Version::parse(current),
    ) {
        return l > c;
    }

    let latest_parts: Vec<u32> = latest.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = current.split('.').filter_map(|p| p.parse().ok()).collect();

    for i in 0..3 {
        let l = latest_parts.get(i).copied().unwrap_or(0);
        let c = current_parts.get(i).copied().unwrap_or(0);
        if l != c {
            return l > c;
        }
    }
    false
}
