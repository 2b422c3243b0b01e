use std::sync::Arc;

use super::{EventRecord, NewEvent, NewVisit, VisitHandle, VisitUpdate};

/// 事件批量写入后端
#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    /// 一次性写入整批事件，失败时整批丢弃，调用方不重试
    async fn insert_events(&self, events: Vec<EventRecord>) -> anyhow::Result<()>;
}

/// 页面访问写入后端
#[async_trait::async_trait]
pub trait VisitStore: Send + Sync {
    /// 插入访问行，返回行句柄
    async fn insert_visit(&self, visit: NewVisit) -> anyhow::Result<VisitHandle>;

    /// 按句柄回填离开页面时的统计
    async fn update_visit(&self, handle: VisitHandle, update: VisitUpdate) -> anyhow::Result<()>;
}

/// 埋点入口
///
/// 只保证至多一次：实现方可以静默丢弃事件，调用方也不会得到写入结果。
pub trait TelemetrySink: Send + Sync {
    fn record(&self, event: NewEvent);
}

/// 丢弃所有事件
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn record(&self, _event: NewEvent) {}
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for Arc<T> {
    fn record(&self, event: NewEvent) {
        (**self).record(event)
    }
}
