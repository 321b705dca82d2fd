//! CLI subcommands.

pub mod config;
pub mod simulate;

use std::path::Path;

use navtunnel::config::ConfigFile;

use crate::error::CliError;

/// Load `path`, or the default config file when none is given.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}
