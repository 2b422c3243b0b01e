//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// sitepulse - consent-gated visitor analytics service
#[derive(Parser)]
#[command(name = "sitepulse")]
#[command(version)]
#[command(about = "Consent-gated visitor analytics for the marketing site", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP service (default)
    Serve,

    /// Print the admin analytics report
    Report {
        /// Trailing window in days: 7, 30 or 90
        #[arg(long, short = 'd', default_value_t = 7)]
        days: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply pending database migrations
    Migrate,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
