//! SeaORM storage backend
//!
//! SQLite, MySQL/MariaDB and PostgreSQL behind the store traits.

mod analytics;
mod connection;
mod converters;
mod events;
mod visits;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{Result, SitepulseError};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{
    event_to_active_model, model_to_stored_event, model_to_visit_record, visit_to_active_model,
};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(SitepulseError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based store
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
    backend_name: String,
}

impl SeaOrmStore {
    /// 连接数据库并执行迁移
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let database_url = config.database_url.as_str();
        if database_url.is_empty() {
            return Err(SitepulseError::database_config("database_url is not set"));
        }

        let backend_name = infer_backend_from_url(database_url)?;
        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, &backend_name, config).await?
        };

        run_migrations(&db).await?;

        info!("{} store initialized", backend_name.to_uppercase());
        Ok(Self { db, backend_name })
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
