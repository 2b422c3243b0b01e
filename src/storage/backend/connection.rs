use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{Result, SitepulseError};
use migration::{Migrator, MigratorTrait};

/// 连接 SQLite 数据库（自动建库，WAL 模式）
pub async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection> {
    use sea_orm::SqlxSqliteConnector;
    use sea_orm::sqlx::SqlitePool;
    use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
    use std::str::FromStr;

    let opt = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| SitepulseError::database_config(format!("Invalid SQLite URL: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(5));

    let pool = SqlitePool::connect_with(opt).await.map_err(|e| {
        SitepulseError::database_connection(format!("Unable to open SQLite database: {}", e))
    })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// 连接 MySQL / PostgreSQL
pub async fn connect_generic(
    database_url: &str,
    backend_name: &str,
    config: &DatabaseConfig,
) -> Result<DatabaseConnection> {
    let timeout = std::time::Duration::from_secs(config.timeout);

    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(config.pool_size)
        .min_connections(config.pool_size.min(2))
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .idle_timeout(std::time::Duration::from_secs(300))
        .sqlx_logging(false);

    Database::connect(opt).await.map_err(|e| {
        SitepulseError::database_connection(format!(
            "Unable to connect to {} database: {}",
            backend_name.to_uppercase(),
            e
        ))
    })
}

/// 执行全部未应用的迁移
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| SitepulseError::database_operation(format!("Migration failed: {}", e)))?;

    info!("Database migrations completed");
    Ok(())
}
