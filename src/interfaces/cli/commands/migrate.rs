use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::storage::SeaOrmStore;

/// Connect to the configured database and apply migrations
pub async fn run_migrations() -> Result<(), CliError> {
    let config = crate::config::get_config();
    let store = SeaOrmStore::connect(&config.database).await?;
    println!(
        "{} {}",
        "Migrations applied on".green(),
        store.backend_name().to_uppercase().blue()
    );
    Ok(())
}
