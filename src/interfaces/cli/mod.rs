//! CLI interface module

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands};
use commands::{config_generate, run_migrations, show_report};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::SitepulseError> for CliError {
    fn from(err: crate::errors::SitepulseError) -> Self {
        match err {
            crate::errors::SitepulseError::Validation(msg) => CliError::ParseError(msg),
            other => CliError::StorageError(other.to_string()),
        }
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Report { days, json } => show_report(days, json).await,
        Commands::Migrate => run_migrations().await,
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => config_generate(output_path, force).await,
        Commands::Serve => Err(CliError::CommandError(
            "serve is handled by the server runtime".to_string(),
        )),
    }
}
