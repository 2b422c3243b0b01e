//! HTTP API
//!
//! 浏览器端写入、管理端报表、聊天代理和健康检查。

pub mod auth;
pub mod handlers;
pub mod helpers;
pub mod routes;
pub mod types;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::analytics::{AnalyticsService, ReportOptions};
use crate::config::StaticConfig;
use crate::services::ChatService;
use crate::storage::SiteStore;

pub use routes::configure;

/// 所有 handler 共享的状态
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SiteStore>,
    pub analytics: AnalyticsService,
    pub chat: ChatService,
    /// 为空时关闭管理端
    pub admin_token: String,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Arc<dyn SiteStore>, chat: ChatService, config: &StaticConfig) -> Self {
        let options = ReportOptions {
            event_sample_limit: config.analytics.event_sample_limit,
            top_n: config.analytics.top_n,
        };

        Self {
            analytics: AnalyticsService::new(store.clone(), options),
            store,
            chat,
            admin_token: config.api.admin_token.clone(),
            started_at: Utc::now(),
        }
    }
}
