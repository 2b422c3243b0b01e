//! Admin report tests
//!
//! Seeds the in-memory store with timestamped rows and checks the trailing
//! window report built by `AnalyticsService`.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use sitepulse::analytics::{AnalyticsService, ReportOptions, TrailingWindow};
use sitepulse::errors::SitepulseError;
use sitepulse::identity::{Fingerprint, SessionId};
use sitepulse::storage::MemoryStore;
use sitepulse::tracking::{EventRecord, EventType, NewEvent, VisitRecord};

// =============================================================================
// Test Setup
// =============================================================================

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
}

fn visit(session: &str, fp: Option<&str>, path: &str, device: &str) -> VisitRecord {
    VisitRecord {
        id: 0,
        session_id: session.to_string(),
        fingerprint: fp.map(str::to_string),
        page_path: path.to_string(),
        device_type: device.to_string(),
        referrer: None,
        scroll_depth: 0,
        time_on_page: 0,
        clicks: 0,
        created_at: now(),
    }
}

fn event(event: NewEvent) -> EventRecord {
    EventRecord {
        session_id: SessionId::from("s-1"),
        fingerprint: Some(Fingerprint::from("abc123")),
        page_path: "/".to_string(),
        event,
    }
}

fn service(store: Arc<MemoryStore>, options: ReportOptions) -> AnalyticsService {
    AnalyticsService::new(store, options)
}

/// 7 天内三位访客、四次访问，外加一条 10 天前的访问
fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let day = Duration::days(1);

    let mut home = visit("s-1", Some("fp-a"), "/", "desktop");
    home.time_on_page = 30;
    home.scroll_depth = 80;
    store.insert_visit_at(home, now() - day);

    let mut services = visit("s-1", Some("fp-a"), "/services", "desktop");
    services.time_on_page = 0;
    services.scroll_depth = 0;
    store.insert_visit_at(services, now() - day);

    let mut mobile = visit("s-2", Some("fp-a"), "/", "mobile");
    mobile.time_on_page = 61;
    mobile.scroll_depth = 41;
    store.insert_visit_at(mobile, now() - day * 2);

    store.insert_visit_at(visit("s-3", None, "/contact", "tablet"), now() - day * 6);
    store.insert_visit_at(visit("s-old", Some("fp-z"), "/", "desktop"), now() - day * 10);

    store.insert_event_at(
        event(NewEvent::new(EventType::CtaClick).with_metadata("category", "hero")),
        now() - day,
    );
    store.insert_event_at(
        event(NewEvent::new(EventType::ServiceClick).with_metadata("category", "web")),
        now() - day,
    );
    store.insert_event_at(
        event(NewEvent::new(EventType::CtaClick).with_metadata("category", "hero")),
        now() - day * 2,
    );
    store.insert_event_at(event(NewEvent::new(EventType::Click)), now() - day * 3);
    store.insert_event_at(event(NewEvent::new(EventType::Click)), now() - day * 20);

    store
}

// =============================================================================
// Report
// =============================================================================

#[tokio::test]
async fn test_week_report_over_seeded_rows() {
    let report = service(seeded_store(), ReportOptions::default())
        .report_at(TrailingWindow::Week, now())
        .await
        .unwrap();

    assert_eq!(report.since, now() - Duration::days(7));
    assert_eq!(report.total_visits, 4);
    assert_eq!(report.unique_sessions, 3);
    assert_eq!(report.unique_fingerprints, 1);

    // 只统计正值：(30 + 61) / 2，(80 + 41) / 2
    assert_eq!(report.avg_time_on_page, 46);
    assert_eq!(report.avg_scroll_depth, 61);

    assert_eq!(report.devices.desktop, 2);
    assert_eq!(report.devices.mobile, 1);
    assert_eq!(report.devices.tablet, 1);

    assert_eq!(report.top_pages[0].name, "/");
    assert_eq!(report.top_pages[0].count, 2);

    assert_eq!(report.event_sample_size, 4);
    assert!(!report.event_sample_truncated);
    assert_eq!(report.top_event_types[0].name, "cta_click");
    assert_eq!(report.top_event_types[0].count, 2);
    assert_eq!(report.top_categories[0].name, "hero");
    assert_eq!(report.top_categories.len(), 2);
}

#[tokio::test]
async fn test_month_window_includes_older_rows() {
    let report = service(seeded_store(), ReportOptions::default())
        .report_at(TrailingWindow::Month, now())
        .await
        .unwrap();

    assert_eq!(report.total_visits, 5);
    assert_eq!(report.unique_sessions, 4);
    assert_eq!(report.unique_fingerprints, 2);
    assert_eq!(report.event_sample_size, 5);
}

#[tokio::test]
async fn test_event_sample_is_capped_to_most_recent() {
    let store = seeded_store();
    let report = service(
        store,
        ReportOptions {
            event_sample_limit: 2,
            top_n: 10,
        },
    )
    .report_at(TrailingWindow::Quarter, now())
    .await
    .unwrap();

    assert_eq!(report.event_sample_size, 2);
    assert!(report.event_sample_truncated);

    // 最近的两条都在前一天
    let mut types: Vec<_> = report
        .top_event_types
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    types.sort();
    assert_eq!(types, ["cta_click", "service_click"]);
}

#[tokio::test]
async fn test_empty_store_reports_zeroes() {
    let report = service(Arc::new(MemoryStore::new()), ReportOptions::default())
        .report_at(TrailingWindow::Week, now())
        .await
        .unwrap();

    assert_eq!(report.total_visits, 0);
    assert_eq!(report.unique_sessions, 0);
    assert_eq!(report.avg_time_on_page, 0);
    assert_eq!(report.avg_scroll_depth, 0);
    assert!(report.top_pages.is_empty());
    assert!(report.top_categories.is_empty());
}

#[tokio::test]
async fn test_read_failure_maps_to_query_error() {
    let store = seeded_store();
    store.set_fail_reads(true);

    let err = service(store, ReportOptions::default())
        .report_at(TrailingWindow::Week, now())
        .await
        .unwrap_err();
    assert!(matches!(err, SitepulseError::AnalyticsQueryFailed(_)));
}

#[test]
fn test_window_parsing() {
    assert_eq!("30d".parse::<TrailingWindow>().unwrap(), TrailingWindow::Month);
    assert_eq!(TrailingWindow::try_from(90u32).unwrap(), TrailingWindow::Quarter);
    assert!(TrailingWindow::try_from(14u32).is_err());
}
