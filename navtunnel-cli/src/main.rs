//! navtunnel CLI - Command-line interface
//!
//! Replays scripted drives through the tunnel hand-off logic and manages the
//! configuration file.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;

use commands::config::ConfigCommands;
use commands::simulate::SimulateArgs;
use error::CliError;

/// Tunnel detection and simulated-location hand-off.
#[derive(Debug, Parser)]
#[command(name = "navtunnel", version, about, long_about = None)]
struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a scripted drive through a synthetic tunnel
    Simulate(SimulateArgs),

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Config { command } => commands::config::run(command, cli.config.as_deref()),
        Commands::Simulate(args) => {
            let config = commands::load_config(cli.config.as_deref())?;

            let mut logging = config.logging.clone();
            if cli.verbose {
                logging.level = "debug".to_string();
            }
            let _guard = navtunnel::logging::init_logging(&logging)?;

            commands::simulate::run(args, &config).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_simulate_flags() {
        let cli = Cli::try_parse_from([
            "navtunnel",
            "simulate",
            "--speed",
            "25",
            "--json",
            "--config",
            "/tmp/nav.ini",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/nav.ini")));
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.speed, 25.0);
                assert!(args.json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_set() {
        let cli = Cli::try_parse_from([
            "navtunnel",
            "config",
            "set",
            "tunnel.exit_unqualified_threshold",
            "4",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Set { .. }
            }
        ));
    }
}
