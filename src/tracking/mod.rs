//! 站点埋点
//!
//! - `EventBatcher`：交互事件排队、防抖后批量写入
//! - `PageViewRecorder`：页面访问插入与离开时回填
//! - `Tracker`：把两者绑定到同一个 `TrackingContext`
//!
//! 所有写入都先经过 analytics 同意检查，写入失败只记录日志。

pub mod batcher;
pub mod event;
pub mod page_view;
pub mod sink;
pub mod timer;
pub mod visit;

use std::sync::Arc;
use tokio::time::Duration;
use tracing::debug;

use crate::config::TrackingConfig;
use crate::consent::{ConsentCategory, ConsentGate};
use crate::identity::{DeviceSignals, Fingerprint, IdentityResolver, SessionId};

pub use batcher::{EventBatcher, FlushOutcome};
pub use event::{EventRecord, EventType, NewEvent, StoredEvent};
pub use page_view::{PageViewRecorder, ScrollMetrics, scroll_depth};
pub use sink::{EventStore, NoopTelemetry, TelemetrySink, VisitStore};
pub use timer::DebounceTimer;
pub use visit::{DeviceClass, NewVisit, VisitHandle, VisitRecord, VisitUpdate};

/// 默认防抖时长
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(2000);

/// 一次页面生命周期内不变的身份与同意信息
#[derive(Clone)]
pub struct TrackingContext {
    pub session_id: SessionId,
    pub fingerprint: Fingerprint,
    pub consent: ConsentGate,
}

impl TrackingContext {
    pub fn new(session_id: SessionId, fingerprint: Fingerprint, consent: ConsentGate) -> Self {
        Self {
            session_id,
            fingerprint,
            consent,
        }
    }

    /// 通过身份解析器取得会话 ID 和指纹
    pub fn resolve(
        identity: &IdentityResolver,
        signals: &DeviceSignals,
        consent: ConsentGate,
    ) -> Self {
        Self::new(identity.session_id(), identity.fingerprint(signals), consent)
    }

    pub fn tracking_allowed(&self) -> bool {
        self.consent.has_consent(ConsentCategory::Analytics)
    }
}

/// 页面埋点门面
#[derive(Clone)]
pub struct Tracker {
    context: TrackingContext,
    batcher: EventBatcher,
    recorder: PageViewRecorder,
    enabled: bool,
}

impl Tracker {
    pub fn new(
        context: TrackingContext,
        events: Arc<dyn EventStore>,
        visits: Arc<dyn VisitStore>,
        debounce: Duration,
    ) -> Self {
        Self {
            batcher: EventBatcher::new(context.clone(), events, debounce),
            recorder: PageViewRecorder::new(context.clone(), visits),
            context,
            enabled: true,
        }
    }

    /// 按 `tracking` 配置段构建
    ///
    /// `enabled = false` 时所有写入路径都是空操作，与同意状态无关。
    pub fn from_config(
        config: &TrackingConfig,
        context: TrackingContext,
        events: Arc<dyn EventStore>,
        visits: Arc<dyn VisitStore>,
    ) -> Self {
        let mut tracker = Self::new(
            context,
            events,
            visits,
            Duration::from_millis(config.debounce_ms),
        );
        tracker.enabled = config.enabled;
        if !tracker.enabled {
            debug!("Tracker: tracking disabled by config");
        }
        tracker
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 调用方使用的埋点入口，关闭埋点时为空实现
    pub fn telemetry(&self) -> Arc<dyn TelemetrySink> {
        if self.enabled {
            Arc::new(self.clone())
        } else {
            Arc::new(NoopTelemetry)
        }
    }

    /// 路由切换：写出上一页的事件并回填访问，再记录新页面
    pub async fn navigate(
        &self,
        path: &str,
        viewport_width: u32,
        referrer: Option<String>,
    ) -> Option<VisitHandle> {
        if !self.enabled {
            return None;
        }
        debug!("Tracker: navigating to {}", path);
        self.batcher.teardown();
        self.recorder.leave_page().await;
        self.batcher.set_current_path(path);
        self.recorder.enter_page(path, viewport_width, referrer).await
    }

    /// 记录一次交互，同时计入当前页面的点击数
    pub fn click(&self, event: NewEvent) -> bool {
        if !self.enabled {
            return false;
        }
        self.recorder.record_click();
        self.batcher.track_event(event)
    }

    /// 记录非点击类事件（曝光、表单提交等）
    pub fn track(&self, event: NewEvent) -> bool {
        if !self.enabled {
            return false;
        }
        self.batcher.track_event(event)
    }

    pub fn scroll(&self, metrics: ScrollMetrics) -> u8 {
        if !self.enabled {
            return 0;
        }
        self.recorder.record_scroll(metrics)
    }

    /// 页面关闭：回填当前访问并写出剩余事件
    pub async fn shutdown(&self) -> FlushOutcome {
        if !self.enabled {
            return FlushOutcome::Skipped;
        }
        self.recorder.leave_page().await;
        match self.batcher.teardown().await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Tracker: final flush task failed: {}", e);
                FlushOutcome::Dropped(0)
            }
        }
    }

    pub fn context(&self) -> &TrackingContext {
        &self.context
    }

    pub fn batcher(&self) -> &EventBatcher {
        &self.batcher
    }

    pub fn recorder(&self) -> &PageViewRecorder {
        &self.recorder
    }
}

impl TelemetrySink for Tracker {
    fn record(&self, event: NewEvent) {
        self.track(event);
    }
}
