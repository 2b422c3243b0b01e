//! 页面访问记录
//!
//! 进入页面时插入一行访问记录并保留句柄，离开页面时按句柄回填
//! 最大滚动深度、停留秒数和点击次数。每次访问最多回填一次。

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use super::sink::VisitStore;
use super::{DeviceClass, NewVisit, TrackingContext, VisitHandle, VisitUpdate};

/// 一次滚动采样
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub viewport_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            viewport_height,
        }
    }
}

/// 滚动百分比，页面不可滚动时为 0
pub fn scroll_depth(metrics: ScrollMetrics) -> u8 {
    let scrollable = metrics.scroll_height - metrics.viewport_height;
    if scrollable <= 0.0 || !scrollable.is_finite() {
        return 0;
    }
    let percent = (metrics.scroll_top / scrollable * 100.0).round();
    if percent.is_nan() {
        return 0;
    }
    percent.clamp(0.0, 100.0) as u8
}

struct ActivePage {
    generation: u64,
    path: String,
    handle: Option<VisitHandle>,
    started_at: Instant,
    max_scroll: u8,
    clicks: u32,
}

struct RecorderInner {
    context: TrackingContext,
    store: Arc<dyn VisitStore>,
    page: Mutex<Option<ActivePage>>,
    generation: AtomicU64,
}

/// 页面访问记录器
#[derive(Clone)]
pub struct PageViewRecorder {
    inner: Arc<RecorderInner>,
}

impl PageViewRecorder {
    pub fn new(context: TrackingContext, store: Arc<dyn VisitStore>) -> Self {
        Self {
            inner: Arc::new(RecorderInner {
                context,
                store,
                page: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// 进入新页面
    ///
    /// 先结束上一个页面，再插入新的访问行。未同意或插入失败时返回 None，
    /// 之后这个页面的离开也不会产生写入。
    pub async fn enter_page(
        &self,
        path: &str,
        viewport_width: u32,
        referrer: Option<String>,
    ) -> Option<VisitHandle> {
        self.leave_page().await;

        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1;
        *self.inner.page.lock() = Some(ActivePage {
            generation,
            path: path.to_string(),
            handle: None,
            started_at: Instant::now(),
            max_scroll: 0,
            clicks: 0,
        });

        let context = &self.inner.context;
        if !context.tracking_allowed() {
            trace!("PageViewRecorder: analytics consent missing, {} not recorded", path);
            return None;
        }

        let visit = NewVisit {
            session_id: context.session_id.clone(),
            fingerprint: Some(context.fingerprint.clone()),
            page_path: path.to_string(),
            device_type: DeviceClass::from_width(viewport_width),
            referrer: referrer.filter(|r| !r.is_empty()),
        };

        match self.inner.store.insert_visit(visit).await {
            Ok(handle) => {
                let mut page = self.inner.page.lock();
                match page.as_mut() {
                    Some(active) if active.generation == generation => {
                        active.handle = Some(handle);
                    }
                    _ => {
                        // 插入返回前已经离开，这一行不再回填
                        debug!(
                            "PageViewRecorder: page {} left before insert returned",
                            path
                        );
                    }
                }
                debug!("PageViewRecorder: visit {} recorded for {}", handle.id(), path);
                Some(handle)
            }
            Err(e) => {
                warn!("PageViewRecorder: insert_visit failed for {}: {}", path, e);
                None
            }
        }
    }

    /// 记录一次滚动，返回当前页面的最大滚动深度
    pub fn record_scroll(&self, metrics: ScrollMetrics) -> u8 {
        if !self.inner.context.tracking_allowed() {
            return 0;
        }
        let depth = scroll_depth(metrics);
        let mut page = self.inner.page.lock();
        match page.as_mut() {
            Some(active) => {
                active.max_scroll = active.max_scroll.max(depth);
                active.max_scroll
            }
            None => 0,
        }
    }

    /// 记录一次点击
    pub fn record_click(&self) {
        if !self.inner.context.tracking_allowed() {
            return;
        }
        if let Some(active) = self.inner.page.lock().as_mut() {
            active.clicks = active.clicks.saturating_add(1);
        }
    }

    /// 离开当前页面并回填统计
    ///
    /// 返回本次发出的回填内容；没有可回填的访问行时返回 None。
    pub async fn leave_page(&self) -> Option<VisitUpdate> {
        let active = self.inner.page.lock().take()?;
        let handle = active.handle?;

        if !self.inner.context.tracking_allowed() {
            trace!(
                "PageViewRecorder: consent withdrawn, visit {} not updated",
                handle.id()
            );
            return None;
        }

        let update = VisitUpdate {
            scroll_depth: active.max_scroll,
            time_on_page: u32::try_from(active.started_at.elapsed().as_secs())
                .unwrap_or(u32::MAX),
            clicks: active.clicks,
        };

        match self.inner.store.update_visit(handle, update).await {
            Ok(()) => trace!(
                "PageViewRecorder: visit {} updated for {}",
                handle.id(),
                active.path
            ),
            Err(e) => warn!(
                "PageViewRecorder: update_visit failed for visit {}: {}",
                handle.id(),
                e
            ),
        }
        Some(update)
    }

    pub fn current_path(&self) -> Option<String> {
        self.inner.page.lock().as_ref().map(|p| p.path.clone())
    }

    pub fn current_handle(&self) -> Option<VisitHandle> {
        self.inner.page.lock().as_ref().and_then(|p| p.handle)
    }

    pub fn max_scroll(&self) -> u8 {
        self.inner.page.lock().as_ref().map_or(0, |p| p.max_scroll)
    }

    pub fn clicks(&self) -> u32 {
        self.inner.page.lock().as_ref().map_or(0, |p| p.clicks)
    }
}
