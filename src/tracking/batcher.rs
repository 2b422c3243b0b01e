//! 交互事件批量写入
//!
//! 事件先进入内存队列，每次入队都会重置防抖定时器；
//! 定时器到期或页面卸载时整批写入。写入失败时整批丢弃，
//! 不会重新入队，也不会重试。

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, trace, warn};

use super::sink::{EventStore, TelemetrySink};
use super::{EventRecord, NewEvent, TrackingContext};

/// 一次刷盘的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// 未获得 analytics 同意或埋点已关闭，没有发起写入
    Skipped,
    /// 队列为空，没有发起写入
    Empty,
    /// 写入成功的事件数
    Written(usize),
    /// 写入失败后丢弃的事件数
    Dropped(usize),
}

struct BatcherInner {
    queue: Mutex<Vec<EventRecord>>,
    current_path: RwLock<String>,
    context: TrackingContext,
    store: Arc<dyn EventStore>,
    timer: super::DebounceTimer,
}

/// 事件批量写入器
///
/// 克隆共享同一个队列。
#[derive(Clone)]
pub struct EventBatcher {
    inner: Arc<BatcherInner>,
}

impl EventBatcher {
    pub fn new(context: TrackingContext, store: Arc<dyn EventStore>, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(BatcherInner {
                queue: Mutex::new(Vec::new()),
                current_path: RwLock::new("/".to_string()),
                context,
                store,
                timer: super::DebounceTimer::new(debounce),
            }),
        }
    }

    /// 设置之后入队事件所属的页面
    pub fn set_current_path(&self, path: &str) {
        *self.inner.current_path.write() = path.to_string();
    }

    pub fn current_path(&self) -> String {
        self.inner.current_path.read().clone()
    }

    /// 入队并重置防抖定时器，未同意时直接忽略
    ///
    /// 返回事件是否进入了队列。
    pub fn track_event(&self, event: NewEvent) -> bool {
        let context = &self.inner.context;
        if !context.tracking_allowed() {
            trace!(
                "EventBatcher: analytics consent missing, dropping {}",
                event.event_type
            );
            return false;
        }

        let record = EventRecord {
            session_id: context.session_id.clone(),
            fingerprint: Some(context.fingerprint.clone()),
            page_path: self.current_path(),
            event,
        };

        let queued = {
            let mut queue = self.inner.queue.lock();
            queue.push(record);
            queue.len()
        };
        trace!("EventBatcher: queued event, {} pending", queued);

        let batcher = self.clone();
        self.inner.timer.arm(move || async move {
            debug!("EventBatcher: debounce elapsed, flushing");
            batcher.flush().await;
        });

        true
    }

    /// 立即写出队列中的全部事件
    pub async fn flush(&self) -> FlushOutcome {
        if !self.inner.context.tracking_allowed() {
            trace!("EventBatcher: analytics consent missing, flush skipped");
            return FlushOutcome::Skipped;
        }

        let batch = std::mem::take(&mut *self.inner.queue.lock());
        if batch.is_empty() {
            trace!("EventBatcher: No events to flush");
            return FlushOutcome::Empty;
        }

        let count = batch.len();
        match self.inner.store.insert_events(batch).await {
            Ok(()) => {
                debug!("EventBatcher: Successfully flushed {} events", count);
                FlushOutcome::Written(count)
            }
            Err(e) => {
                warn!(
                    "EventBatcher: insert_events failed: {}, {} events dropped",
                    e, count
                );
                FlushOutcome::Dropped(count)
            }
        }
    }

    /// 页面卸载：取消定时器并在后台写出剩余事件
    ///
    /// 返回的句柄可以忽略。
    pub fn teardown(&self) -> JoinHandle<FlushOutcome> {
        let batcher = self.clone();
        self.inner
            .timer
            .fire_now(move || async move { batcher.flush().await })
    }

    /// 当前排队的事件数
    pub fn pending(&self) -> usize {
        self.inner.queue.lock().len()
    }

    pub fn context(&self) -> &TrackingContext {
        &self.inner.context
    }
}

impl TelemetrySink for EventBatcher {
    fn record(&self, event: NewEvent) {
        self.track_event(event);
    }
}
