use std::sync::Arc;

use tracing::info;

use crate::analytics::AnalyticsSource;
use crate::config::DatabaseConfig;
use crate::errors::Result;
use crate::tracking::{EventStore, VisitStore};

pub mod backend;
pub mod memory;

pub use backend::SeaOrmStore;
pub use memory::MemoryStore;

/// 同时提供写入和报表读取的存储
pub trait SiteStore: EventStore + VisitStore + AnalyticsSource {}

impl<T: EventStore + VisitStore + AnalyticsSource> SiteStore for T {}

/// `database_url` 为该值时使用进程内存储
pub const MEMORY_DATABASE_URL: &str = "memory";

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<dyn SiteStore>> {
        if config.database_url == MEMORY_DATABASE_URL {
            info!("Using in-memory store, data is lost on exit");
            return Ok(Arc::new(MemoryStore::new()));
        }

        let store = SeaOrmStore::connect(config).await?;
        Ok(Arc::new(store))
    }
}
