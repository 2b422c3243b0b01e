//! Mode routing
//!
//! - Server mode (HTTP server)
//! - CLI mode (report, migrate, config)
//!
//! The mode is selected from the parsed subcommand and the enabled features.

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "server")]
pub use server::run_server;

#[cfg(feature = "cli")]
pub use cli::run_cli;

use crate::cli::Commands;

/// Mode detection result
#[derive(Debug, PartialEq)]
pub enum Mode {
    #[cfg(feature = "server")]
    Server,
    #[cfg(feature = "cli")]
    Cli,
    Unknown,
}

/// Pick the execution mode for a parsed subcommand
///
/// No subcommand or `serve` runs the server; anything else is a CLI command.
pub fn detect_mode(command: Option<&Commands>) -> Mode {
    match command {
        None | Some(Commands::Serve) => {
            #[cfg(feature = "server")]
            return Mode::Server;
            #[cfg(not(feature = "server"))]
            return Mode::Unknown;
        }
        Some(_) => {
            #[cfg(feature = "cli")]
            return Mode::Cli;
            #[cfg(not(feature = "cli"))]
            return Mode::Unknown;
        }
    }
}
