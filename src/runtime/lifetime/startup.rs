use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::AppState;
use crate::config::StaticConfig;
use crate::services::ChatService;
use crate::storage::{MEMORY_DATABASE_URL, StorageFactory};

pub struct StartupContext {
    pub state: AppState,
}

/// 准备服务器启动的上下文：存储、聊天代理与共享状态
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let store = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    if config.database.database_url != MEMORY_DATABASE_URL {
        info!("Storage backend ready, schema is up to date");
    }

    let chat = ChatService::from_config(&config.chat);

    if config.api.admin_token.is_empty() {
        warn!("Admin API is disabled (api.admin_token is empty)");
    } else {
        info!("Admin API available at: /api/admin");
    }

    if config.chat.gateway_url.is_empty() {
        info!("Chat gateway not configured, /api/chat answers with the fallback reply");
    }

    let state = AppState::new(Arc::clone(&store), chat, config);

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );
    Ok(StartupContext { state })
}
