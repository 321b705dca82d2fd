//! CLI error type.

use thiserror::Error;

use navtunnel::config::ConfigError;
use navtunnel::logging::LoggingError;
use navtunnel::route::RouteError;

/// Errors surfaced to the user by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error("Invalid scenario: {0}")]
    Scenario(String),

    #[error("Failed to build scenario route: {0}")]
    Route(#[from] RouteError),

    #[error("Failed to serialize output: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
