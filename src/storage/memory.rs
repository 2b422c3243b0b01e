//! 进程内存储
//!
//! 用于测试和无数据库的本地运行，记录每个写入接口的调用次数，
//! 并可以让写入或读取整体失败。

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::analytics::AnalyticsSource;
use crate::errors::SitepulseError;
use crate::tracking::{
    EventRecord, EventStore, NewVisit, StoredEvent, VisitHandle, VisitRecord, VisitStore,
    VisitUpdate,
};

#[derive(Default)]
pub struct MemoryStore {
    visits: Mutex<Vec<VisitRecord>>,
    events: Mutex<Vec<StoredEvent>>,
    patched: Mutex<HashSet<i64>>,
    next_id: AtomicI64,
    event_insert_calls: AtomicUsize,
    visit_insert_calls: AtomicUsize,
    visit_update_calls: AtomicUsize,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 之后的写入全部返回错误（调用仍计数）
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn event_insert_calls(&self) -> usize {
        self.event_insert_calls.load(Ordering::SeqCst)
    }

    pub fn visit_insert_calls(&self) -> usize {
        self.visit_insert_calls.load(Ordering::SeqCst)
    }

    pub fn visit_update_calls(&self) -> usize {
        self.visit_update_calls.load(Ordering::SeqCst)
    }

    /// 所有写入接口的调用总数
    pub fn write_calls(&self) -> usize {
        self.event_insert_calls() + self.visit_insert_calls() + self.visit_update_calls()
    }

    pub fn events(&self) -> Vec<StoredEvent> {
        self.events.lock().clone()
    }

    pub fn visits(&self) -> Vec<VisitRecord> {
        self.visits.lock().clone()
    }

    /// 以指定时间写入一条事件，不计入调用次数
    pub fn insert_event_at(&self, record: EventRecord, created_at: DateTime<Utc>) -> i64 {
        let id = self.allocate_id();
        self.events.lock().push(StoredEvent {
            id,
            record,
            created_at,
        });
        id
    }

    /// 以指定时间写入一条完整访问行，不计入调用次数
    pub fn insert_visit_at(&self, mut visit: VisitRecord, created_at: DateTime<Utc>) -> i64 {
        visit.id = self.allocate_id();
        visit.created_at = created_at;
        let id = visit.id;
        self.visits.lock().push(visit);
        id
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn check_writable(&self) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("memory store is rejecting writes");
        }
        Ok(())
    }

    fn check_readable(&self) -> anyhow::Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("memory store is rejecting reads");
        }
        Ok(())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_events(&self, events: Vec<EventRecord>) -> anyhow::Result<()> {
        self.event_insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;

        let now = Utc::now();
        for record in events {
            self.insert_event_at(record, now);
        }
        Ok(())
    }
}

#[async_trait]
impl VisitStore for MemoryStore {
    async fn insert_visit(&self, visit: NewVisit) -> anyhow::Result<VisitHandle> {
        self.visit_insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;

        let id = self.allocate_id();
        self.visits.lock().push(VisitRecord {
            id,
            session_id: visit.session_id.to_string(),
            fingerprint: visit.fingerprint.map(|fp| fp.to_string()),
            page_path: visit.page_path,
            device_type: visit.device_type.as_ref().to_string(),
            referrer: visit.referrer,
            scroll_depth: 0,
            time_on_page: 0,
            clicks: 0,
            created_at: Utc::now(),
        });
        Ok(VisitHandle::new(id))
    }

    async fn update_visit(&self, handle: VisitHandle, update: VisitUpdate) -> anyhow::Result<()> {
        self.visit_update_calls.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;

        let mut visits = self.visits.lock();
        let visit = visits
            .iter_mut()
            .find(|v| v.id == handle.id())
            .ok_or_else(|| SitepulseError::not_found(format!("Visit {} not found", handle.id())))?;
        if !self.patched.lock().insert(handle.id()) {
            return Err(
                SitepulseError::conflict(format!("Visit {} was already updated", handle.id()))
                    .into(),
            );
        }

        visit.scroll_depth = i32::from(update.scroll_depth);
        visit.time_on_page = i32::try_from(update.time_on_page).unwrap_or(i32::MAX);
        visit.clicks = i32::try_from(update.clicks).unwrap_or(i32::MAX);
        Ok(())
    }
}

#[async_trait]
impl AnalyticsSource for MemoryStore {
    async fn visits_since(&self, since: DateTime<Utc>) -> anyhow::Result<Vec<VisitRecord>> {
        self.check_readable()?;
        let mut visits: Vec<VisitRecord> = self
            .visits
            .lock()
            .iter()
            .filter(|v| v.created_at >= since)
            .cloned()
            .collect();
        visits.sort_by_key(|v| (v.created_at, v.id));
        Ok(visits)
    }

    async fn recent_events_since(
        &self,
        since: DateTime<Utc>,
        limit: u64,
    ) -> anyhow::Result<Vec<StoredEvent>> {
        self.check_readable()?;
        let mut events: Vec<StoredEvent> = self
            .events
            .lock()
            .iter()
            .filter(|e| e.created_at >= since)
            .cloned()
            .collect();
        events.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        events.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(events)
    }
}
