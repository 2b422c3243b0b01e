//! 可取消的防抖定时器

use parking_lot::Mutex;
use std::future::Future;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};
use tracing::trace;

/// 防抖定时器
///
/// 同一时刻最多一个待触发任务；再次 `arm` 会取消上一次。
/// 到期后动作在独立任务中执行，`cancel` 只能取消尚未到期的等待，
/// 已经开始的写入不受影响。
pub struct DebounceTimer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebounceTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 重新计时，到期后执行 `action`
    ///
    /// 必须在 tokio 运行时中调用。
    pub fn arm<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            trace!("DebounceTimer: fired after {:?}", delay);
            tokio::spawn(action());
        });

        if let Some(previous) = self.pending.lock().replace(handle) {
            previous.abort();
        }
    }

    /// 放弃等待，立即在独立任务中执行 `action`
    pub fn fire_now<F, Fut>(&self, action: F) -> JoinHandle<Fut::Output>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        if self.cancel() {
            trace!("DebounceTimer: pending wait cancelled, firing now");
        }
        tokio::spawn(action())
    }

    /// 取消待触发的任务，返回是否确实取消了一个
    pub fn cancel(&self) -> bool {
        match self.pending.lock().take() {
            Some(handle) => {
                let armed = !handle.is_finished();
                handle.abort();
                armed
            }
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}
