use clap::Parser;

use sitepulse::cli::Cli;
use sitepulse::runtime::modes::{self, Mode};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    sitepulse::config::init_config(cli.config.as_deref());
    let config = sitepulse::config::get_config();

    match modes::detect_mode(cli.command.as_ref()) {
        #[cfg(feature = "cli")]
        Mode::Cli => {
            let Some(command) = cli.command else {
                return Ok(());
            };
            if let Err(e) = modes::run_cli(command).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        }
        #[cfg(feature = "server")]
        Mode::Server => {
            let _guard = sitepulse::system::logging::init_logging(&config.logging);
            if let Err(e) = modes::run_server().await {
                tracing::error!("Server error: {}", e);
                eprintln!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        Mode::Unknown => {
            eprintln!("No execution mode available. Enable the `server` or `cli` feature.");
            std::process::exit(1);
        }
    }

    Ok(())
}
