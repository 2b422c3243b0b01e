//! Visitor-side tracking tests
//!
//! Drives `Tracker`, `EventBatcher` and `PageViewRecorder` against the
//! in-memory store with a paused tokio clock.

use std::sync::Arc;

use tokio::time::{Duration, sleep};

use sitepulse::consent::{ConsentCategory, ConsentGate};
use sitepulse::identity::{DeviceSignals, IdentityResolver, MemoryStorage};
use sitepulse::storage::MemoryStore;
use sitepulse::tracking::{
    DEFAULT_DEBOUNCE, EventBatcher, EventType, FlushOutcome, NewEvent, PageViewRecorder,
    ScrollMetrics, TelemetrySink, Tracker, TrackingContext,
};

// =============================================================================
// Test Setup
// =============================================================================

fn context(analytics: bool) -> TrackingContext {
    let identity = IdentityResolver::in_memory();
    let consent = ConsentGate::load(Arc::new(MemoryStorage::new()));
    if analytics {
        consent.accept_all();
    }
    TrackingContext::resolve(&identity, &DeviceSignals::default(), consent)
}

fn tracker(analytics: bool) -> (Tracker, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let tracker = Tracker::new(
        context(analytics),
        store.clone(),
        store.clone(),
        DEFAULT_DEBOUNCE,
    );
    (tracker, store)
}

fn cta(id: &str) -> NewEvent {
    NewEvent::new(EventType::CtaClick).with_element(id, "button")
}

// =============================================================================
// End-to-end scenarios
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_no_consent_produces_zero_writes() {
    let (tracker, store) = tracker(false);

    assert!(tracker.navigate("/services", 1280, None).await.is_none());
    assert!(!tracker.click(cta("book-call")));
    assert_eq!(tracker.scroll(ScrollMetrics::new(960.0, 2000.0, 800.0)), 0);
    sleep(Duration::from_secs(3)).await;
    assert!(tracker.navigate("/contact", 1280, None).await.is_none());
    sleep(Duration::from_secs(3)).await;
    assert_eq!(tracker.shutdown().await, FlushOutcome::Skipped);

    assert_eq!(store.write_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_single_click_flushes_once_after_debounce() {
    let (tracker, store) = tracker(true);
    tracker.navigate("/services", 1280, None).await;

    assert!(tracker.click(cta("book-call")));
    sleep(Duration::from_secs(3)).await;

    assert_eq!(store.event_insert_calls(), 1);
    let events = store.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].record.page_path, "/services");
    assert_eq!(events[0].record.event.event_type, EventType::CtaClick);
    assert_eq!(
        events[0].record.session_id,
        tracker.context().session_id
    );
}

#[tokio::test(start_paused = true)]
async fn test_necessary_only_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let consent = ConsentGate::load(Arc::new(MemoryStorage::new()));
    consent.accept_necessary_only();
    assert!(consent.has_consent(ConsentCategory::Necessary));

    let context = TrackingContext::resolve(
        &IdentityResolver::in_memory(),
        &DeviceSignals::default(),
        consent,
    );
    let tracker = Tracker::new(context, store.clone(), store.clone(), DEFAULT_DEBOUNCE);

    tracker.navigate("/", 375, None).await;
    tracker.click(cta("whatsapp"));
    sleep(Duration::from_secs(5)).await;
    tracker.shutdown().await;

    assert_eq!(store.write_calls(), 0);
}

// =============================================================================
// EventBatcher
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_burst_is_coalesced_in_order() {
    let store = Arc::new(MemoryStore::new());
    let batcher = EventBatcher::new(context(true), store.clone(), DEFAULT_DEBOUNCE);
    batcher.set_current_path("/projects");

    for i in 0..5 {
        batcher.track_event(NewEvent::new(EventType::ProjectView).with_project(format!("p{i}")));
        sleep(Duration::from_millis(500)).await;
    }
    // 500ms 间隔不断重置定时器
    assert_eq!(store.event_insert_calls(), 0);
    assert_eq!(batcher.pending(), 5);

    sleep(Duration::from_millis(2100)).await;
    assert_eq!(store.event_insert_calls(), 1);

    let mut events = store.events();
    events.sort_by_key(|e| e.id);
    let projects: Vec<_> = events
        .iter()
        .map(|e| e.record.event.project_id.clone().unwrap_or_default())
        .collect();
    assert_eq!(projects, ["p0", "p1", "p2", "p3", "p4"]);
    assert_eq!(batcher.pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_flush_drops_batch_without_retry() {
    let store = Arc::new(MemoryStore::new());
    store.set_fail_writes(true);
    let batcher = EventBatcher::new(context(true), store.clone(), DEFAULT_DEBOUNCE);

    batcher.track_event(NewEvent::new(EventType::Click));
    batcher.track_event(NewEvent::new(EventType::FormSubmit));
    sleep(Duration::from_secs(10)).await;

    assert_eq!(store.event_insert_calls(), 1);
    assert_eq!(batcher.pending(), 0);
    assert!(store.events().is_empty());

    // 下一批正常写入，不会带上失败的事件
    store.set_fail_writes(false);
    batcher.track_event(NewEvent::new(EventType::WhatsappClick));
    assert_eq!(batcher.flush().await, FlushOutcome::Written(1));
    assert_eq!(store.events().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_flushes_before_debounce() {
    let store = Arc::new(MemoryStore::new());
    let batcher = EventBatcher::new(context(true), store.clone(), DEFAULT_DEBOUNCE);

    batcher.track_event(NewEvent::new(EventType::ServiceClick));
    let outcome = batcher.teardown().await.unwrap();
    assert_eq!(outcome, FlushOutcome::Written(1));

    // 已取消的定时器不会再触发一次写入
    sleep(Duration::from_secs(5)).await;
    assert_eq!(store.event_insert_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_consent_withdrawn_before_flush_skips_write() {
    let store = Arc::new(MemoryStore::new());
    let ctx = context(true);
    let batcher = EventBatcher::new(ctx.clone(), store.clone(), DEFAULT_DEBOUNCE);

    batcher.track_event(NewEvent::new(EventType::Click));
    ctx.consent.accept_necessary_only();
    sleep(Duration::from_secs(3)).await;

    assert_eq!(store.write_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_telemetry_sink_is_fire_and_forget() {
    let store = Arc::new(MemoryStore::new());
    let batcher = EventBatcher::new(context(true), store.clone(), DEFAULT_DEBOUNCE);
    let sink: Arc<dyn TelemetrySink> = Arc::new(batcher.clone());

    sink.record(NewEvent::new("newsletter_signup").with_metadata("source", "footer"));
    sleep(Duration::from_secs(3)).await;

    let events = store.events();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].record.event.event_type,
        EventType::Custom("newsletter_signup".to_string())
    );
    assert_eq!(events[0].record.event.metadata["source"], "footer");
}

// =============================================================================
// PageViewRecorder
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_visit_is_patched_once_by_handle() {
    let store = Arc::new(MemoryStore::new());
    let recorder = PageViewRecorder::new(context(true), store.clone());

    let handle = recorder
        .enter_page("/about", 900, Some("https://google.com".to_string()))
        .await
        .unwrap();
    recorder.record_scroll(ScrollMetrics::new(600.0, 2000.0, 800.0));
    recorder.record_scroll(ScrollMetrics::new(100.0, 2000.0, 800.0));
    recorder.record_click();
    recorder.record_click();
    sleep(Duration::from_millis(42_700)).await;

    let update = recorder.leave_page().await.unwrap();
    assert_eq!(update.scroll_depth, 50);
    assert_eq!(update.time_on_page, 42);
    assert_eq!(update.clicks, 2);

    // 第二次离开没有可回填的行
    assert!(recorder.leave_page().await.is_none());
    assert_eq!(store.visit_update_calls(), 1);

    let visits = store.visits();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].id, handle.id());
    assert_eq!(visits[0].device_type, "tablet");
    assert_eq!(visits[0].referrer.as_deref(), Some("https://google.com"));
    assert_eq!(visits[0].scroll_depth, 50);
    assert_eq!(visits[0].time_on_page, 42);
}

#[tokio::test(start_paused = true)]
async fn test_navigation_updates_previous_visit() {
    let (tracker, store) = tracker(true);

    let first = tracker.navigate("/", 1440, None).await.unwrap();
    tracker.click(cta("hero"));
    sleep(Duration::from_secs(4)).await;
    let second = tracker.navigate("/contact", 1440, None).await.unwrap();
    assert_ne!(first, second);

    let visits = store.visits();
    let home = visits.iter().find(|v| v.id == first.id()).unwrap();
    assert_eq!(home.clicks, 1);
    assert_eq!(home.time_on_page, 4);

    let contact = visits.iter().find(|v| v.id == second.id()).unwrap();
    assert_eq!(contact.clicks, 0);
    assert_eq!(tracker.recorder().current_path().as_deref(), Some("/contact"));
    assert_eq!(tracker.batcher().current_path(), "/contact");
}

#[tokio::test(start_paused = true)]
async fn test_failed_insert_skips_update() {
    let store = Arc::new(MemoryStore::new());
    store.set_fail_writes(true);
    let recorder = PageViewRecorder::new(context(true), store.clone());

    assert!(recorder.enter_page("/", 1280, None).await.is_none());
    assert!(recorder.leave_page().await.is_none());
    assert_eq!(store.visit_insert_calls(), 1);
    assert_eq!(store.visit_update_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unscrollable_page_reports_zero_depth() {
    let store = Arc::new(MemoryStore::new());
    let recorder = PageViewRecorder::new(context(true), store.clone());

    recorder.enter_page("/short", 1280, None).await;
    assert_eq!(
        recorder.record_scroll(ScrollMetrics::new(0.0, 700.0, 800.0)),
        0
    );
    let update = recorder.leave_page().await.unwrap();
    assert_eq!(update.scroll_depth, 0);
    assert_eq!(update.time_on_page, 0);
}
