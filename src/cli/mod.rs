//! Command-line interface for `issue_tracker`.
//!
//! This module provides the CLI parsing and command routing using clap.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::api;
use crate::config::{self, CliOverrides, ServerConfig};
use crate::logging::{self, LogFormat};

/// `issue-tracker` - Project-scoped issue tracker HTTP API.
#[derive(Parser, Debug)]
#[command(name = "issue-tracker")]
#[command(
    author,
    version,
    about = "Project-scoped issue tracker HTTP API",
    long_about = None,
    after_help = "Serves /api/issues/:project. Runs `serve` when no command is given."
)]
pub struct Cli {
    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a YAML config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to listen on (host:port)
    #[arg(long, global = true, value_name = "ADDR")]
    pub bind: Option<String>,

    /// JSONL file backing the ticket store
    #[arg(long, global = true, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server
    Serve,

    /// Print the effective configuration as YAML
    Config,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            bind: self.bind.clone(),
            data: self.data.clone(),
            log_format: self.log_format,
        }
    }

    fn load_config(&self) -> Result<ServerConfig> {
        config::load(self.config.as_deref(), &self.overrides()).context("failed to load configuration")
    }
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Config => {
            print!("{}", config.to_yaml().context("failed to render configuration")?);
        }
        Commands::Serve => {
            logging::init_logging(cli.verbose, cli.quiet, Some(config.log_format))
                .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("failed to start async runtime")?;
            runtime.block_on(api::serve(&config))?;
        }
    }

    Ok(())
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
    fn test_no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["issue-tracker"]).unwrap();
        assert_eq!(cli.command.unwrap_or(Commands::Serve), Commands::Serve);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "issue-tracker",
            "config",
            "-vv",
            "--bind",
            "127.0.0.1:9",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.command, Some(Commands::Config));
        assert_eq!(cli.verbose, 2);
        let overrides = cli.overrides();
        assert_eq!(overrides.bind.as_deref(), Some("127.0.0.1:9"));
        assert_eq!(overrides.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        assert!(Cli::try_parse_from(["issue-tracker", "--log-format", "xml"]).is_err());
    }
}
