//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, `config defaults` and
//! `config path` for viewing and modifying settings from the command line.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use navtunnel::config::{config_file_path, ConfigFile, ConfigKey};

use super::load_config;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., tunnel.exit_unqualified_threshold)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., tunnel.exit_unqualified_threshold)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Print the default configuration as INI
    Defaults,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against `path` (or the default file).
pub fn run(command: ConfigCommands, path: Option<&Path>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key, path),
        ConfigCommands::Set { key, value } => run_set(&key, &value, path),
        ConfigCommands::List => run_list(path),
        ConfigCommands::Defaults => run_defaults(),
        ConfigCommands::Path => run_path(path),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'navtunnel config list' to see available keys.",
            key
        ))
    })
}

fn target_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf).unwrap_or_else(config_file_path)
}

/// Get a configuration value.
fn run_get(key: &str, path: Option<&Path>) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let config = load_config(path)?;
    let value = config_key.get(&config);

    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }

    Ok(())
}

/// Set a configuration value.
fn run_set(key: &str, value: &str, path: Option<&Path>) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut config = load_config(path)?;
    config_key.set(&mut config, value)?;
    // Reject combinations such as min speed above max speed before saving
    config.tunnel_config()?;
    match path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }

    println!("Set {} = {}", config_key.name(), value);

    Ok(())
}

/// List all configuration settings.
fn run_list(path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(path)?;

    println!("Configuration Settings");
    println!("======================");
    println!();

    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();

        if section != current_section {
            if !current_section.is_empty() {
                println!();
            }
            println!("[{}]", section);
            current_section = section;
        }

        let value = key.get(&config);
        if value.is_empty() {
            println!("  {} = (not set)", key.key_name());
        } else {
            println!("  {} = {}", key.key_name(), value);
        }
    }

    Ok(())
}

/// Print the default configuration.
fn run_defaults() -> Result<(), CliError> {
    print!("{}", ConfigFile::default().to_ini_string());
    Ok(())
}

/// Show the configuration file path.
fn run_path(path: Option<&Path>) -> Result<(), CliError> {
    println!("{}", target_path(path).display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_writes_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.ini");

        run_set("simulation.time_scale", "8", Some(&path)).unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.tunnel.simulation.time_scale, 8.0);
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.ini");

        let err = run_set("tunnel.bogus", "1", Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_set_rejects_inconsistent_values() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.ini");

        assert!(run_set("simulation.min_speed_mps", "90", Some(&path)).is_err());
        assert!(!path.exists());
    }
}
