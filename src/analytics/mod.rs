//! 管理端报表
//!
//! 先按时间窗口拉取原始访问行和最近事件样本，再在内存中聚合。
//! 事件只取最近的一小部分样本，排行榜的准确度受拉取上限约束。

pub mod report;
pub mod service;
pub mod window;

pub use report::{AnalyticsReport, CountEntry, DeviceBreakdown, ReportOptions, build_report};
pub use service::AnalyticsService;
pub use window::TrailingWindow;

use chrono::{DateTime, Utc};

use crate::tracking::{StoredEvent, VisitRecord};

/// 报表读取后端
#[async_trait::async_trait]
pub trait AnalyticsSource: Send + Sync {
    /// `created_at >= since` 的全部访问行
    async fn visits_since(&self, since: DateTime<Utc>) -> anyhow::Result<Vec<VisitRecord>>;

    /// `created_at >= since` 的事件，按时间倒序，最多 `limit` 条
    async fn recent_events_since(
        &self,
        since: DateTime<Utc>,
        limit: u64,
    ) -> anyhow::Result<Vec<StoredEvent>>;
}
