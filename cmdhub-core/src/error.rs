//! Error types for the cmdhub core library.
//!
//! Uses `thiserror` for public API error types. Package discovery failures are
//! not errors here: they surface as skipped discoveries.

use std::path::PathBuf;

/// Errors from loading or editing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid setting '{setting}': expected <section>.<key>")]
    InvalidSetting { setting: String },

    #[error("Invalid value for '{setting}': {message}")]
    InvalidValue { setting: String, message: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },

    #[error("Could not determine a configuration directory")]
    NoConfigDir,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from resolving commands in a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Command not found: {name}")]
    NotFound { name: String },

    #[error("Command '{name}' is builtin and cannot be {operation}")]
    Builtin { name: String, operation: String },
}
