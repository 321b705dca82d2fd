//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading, parsing or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    /// A value could not be parsed or is out of range. `key` is `section.key`.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Values are individually valid but inconsistent with each other.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
