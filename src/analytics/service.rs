//! 报表服务，HTTP 与 CLI 共用

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use super::{AnalyticsReport, AnalyticsSource, ReportOptions, TrailingWindow, build_report};
use crate::errors::{Result, SitepulseError};

/// 报表服务
#[derive(Clone)]
pub struct AnalyticsService {
    source: Arc<dyn AnalyticsSource>,
    options: ReportOptions,
}

impl AnalyticsService {
    pub fn new(source: Arc<dyn AnalyticsSource>, options: ReportOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> ReportOptions {
        self.options
    }

    /// 以当前时间为终点生成报表
    pub async fn report(&self, window: TrailingWindow) -> Result<AnalyticsReport> {
        self.report_at(window, Utc::now()).await
    }

    /// 以指定时间为终点生成报表
    pub async fn report_at(
        &self,
        window: TrailingWindow,
        now: DateTime<Utc>,
    ) -> Result<AnalyticsReport> {
        let since = window.start_from(now);

        let visits = self.source.visits_since(since).await.map_err(|e| {
            error!("AnalyticsService: failed to fetch visits: {}", e);
            SitepulseError::analytics_query_failed(format!("Failed to fetch visits: {}", e))
        })?;

        let events = self
            .source
            .recent_events_since(since, self.options.event_sample_limit)
            .await
            .map_err(|e| {
                error!("AnalyticsService: failed to fetch events: {}", e);
                SitepulseError::analytics_query_failed(format!("Failed to fetch events: {}", e))
            })?;

        debug!(
            "AnalyticsService: building {} report from {} visits and {} events",
            window,
            visits.len(),
            events.len()
        );

        Ok(build_report(window, since, &visits, &events, self.options))
    }
}
