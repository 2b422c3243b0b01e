//! Storage backend tests
//!
//! Runs the SeaORM store against temporary SQLite databases.

use chrono::{Duration, Utc};
use tempfile::TempDir;

use sitepulse::analytics::AnalyticsSource;
use sitepulse::config::DatabaseConfig;
use sitepulse::errors::SitepulseError;
use sitepulse::identity::{Fingerprint, SessionId};
use sitepulse::storage::{MEMORY_DATABASE_URL, SeaOrmStore, StorageFactory};
use sitepulse::storage::backend::infer_backend_from_url;
use sitepulse::tracking::{
    DeviceClass, EventRecord, EventStore, EventType, NewEvent, NewVisit, VisitHandle, VisitStore,
    VisitUpdate,
};

async fn create_temp_store() -> (SeaOrmStore, TempDir) {
    let td = TempDir::new().unwrap();
    let p = td.path().join("sitepulse_test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", p.display()),
        ..DatabaseConfig::default()
    };
    let store = SeaOrmStore::connect(&config).await.unwrap();
    (store, td)
}

fn new_visit(path: &str) -> NewVisit {
    NewVisit {
        session_id: SessionId::from("1700000000000-abcdefghi"),
        fingerprint: Some(Fingerprint::from("1a2b3c")),
        page_path: path.to_string(),
        device_type: DeviceClass::Mobile,
        referrer: Some("https://news.ycombinator.com".to_string()),
    }
}

fn record(event: NewEvent) -> EventRecord {
    EventRecord {
        session_id: SessionId::from("1700000000000-abcdefghi"),
        fingerprint: None,
        page_path: "/projects".to_string(),
        event,
    }
}

#[tokio::test]
async fn test_sqlite_backend_name() {
    let (store, _td) = create_temp_store().await;
    assert_eq!(store.backend_name(), "sqlite");
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let (store, _td) = create_temp_store().await;
    sitepulse::storage::backend::run_migrations(store.db())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_visit_insert_then_update_by_handle() {
    let (store, _td) = create_temp_store().await;

    let first = store.insert_visit(new_visit("/")).await.unwrap();
    let second = store.insert_visit(new_visit("/")).await.unwrap();
    assert_ne!(first, second);

    store
        .update_visit(
            second,
            VisitUpdate {
                scroll_depth: 75,
                time_on_page: 19,
                clicks: 3,
            },
        )
        .await
        .unwrap();

    let visits = store
        .visits_since(Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(visits.len(), 2);

    let untouched = visits.iter().find(|v| v.id == first.id()).unwrap();
    assert_eq!(untouched.scroll_depth, 0);
    assert_eq!(untouched.clicks, 0);

    let updated = visits.iter().find(|v| v.id == second.id()).unwrap();
    assert_eq!(updated.scroll_depth, 75);
    assert_eq!(updated.time_on_page, 19);
    assert_eq!(updated.clicks, 3);
    assert_eq!(updated.device_type, "mobile");
    assert_eq!(updated.fingerprint.as_deref(), Some("1a2b3c"));
}

#[tokio::test]
async fn test_visit_patched_only_once() {
    let (store, _td) = create_temp_store().await;
    let handle = store.insert_visit(new_visit("/services")).await.unwrap();

    store
        .update_visit(
            handle,
            VisitUpdate {
                scroll_depth: 80,
                time_on_page: 30,
                clicks: 1,
            },
        )
        .await
        .unwrap();

    let err = store
        .update_visit(
            handle,
            VisitUpdate {
                scroll_depth: 5,
                time_on_page: 1,
                clicks: 0,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SitepulseError>(),
        Some(SitepulseError::Conflict(_))
    ));

    let visits = store
        .visits_since(Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(visits[0].scroll_depth, 80);
    assert_eq!(visits[0].time_on_page, 30);
    assert_eq!(visits[0].clicks, 1);
}

#[tokio::test]
async fn test_update_unknown_visit_fails() {
    let (store, _td) = create_temp_store().await;
    let result = store
        .update_visit(
            VisitHandle::new(4242),
            VisitUpdate {
                scroll_depth: 10,
                time_on_page: 1,
                clicks: 0,
            },
        )
        .await;
    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SitepulseError>(),
        Some(SitepulseError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_events_batch_insert_and_recent_read() {
    let (store, _td) = create_temp_store().await;

    store.insert_events(Vec::new()).await.unwrap();

    store
        .insert_events(vec![
            record(
                NewEvent::new(EventType::ProjectView)
                    .with_project("crm-rebuild")
                    .with_metadata("category", "web"),
            ),
            record(
                NewEvent::new(EventType::Click)
                    .with_element("nav-contact", "a")
                    .at(120, 48),
            ),
            record(NewEvent::new(EventType::FormSubmit)),
        ])
        .await
        .unwrap();

    let since = Utc::now() - Duration::hours(1);
    let events = store.recent_events_since(since, 2).await.unwrap();
    assert_eq!(events.len(), 2);
    assert!(events[0].id > events[1].id);

    let all = store.recent_events_since(since, 50).await.unwrap();
    assert_eq!(all.len(), 3);

    let project = all
        .iter()
        .find(|e| e.record.event.event_type == EventType::ProjectView)
        .unwrap();
    assert_eq!(project.record.event.project_id.as_deref(), Some("crm-rebuild"));
    assert_eq!(project.record.event.metadata["category"], "web");
    assert_eq!(project.record.page_path, "/projects");

    let click = all
        .iter()
        .find(|e| e.record.event.event_type == EventType::Click)
        .unwrap();
    assert_eq!(click.record.event.page_x, Some(120));
    assert_eq!(click.record.event.element_id.as_deref(), Some("nav-contact"));
}

#[tokio::test]
async fn test_window_filter_excludes_future_since() {
    let (store, _td) = create_temp_store().await;
    store.insert_visit(new_visit("/")).await.unwrap();

    let visits = store
        .visits_since(Utc::now() + Duration::hours(1))
        .await
        .unwrap();
    assert!(visits.is_empty());
}

#[tokio::test]
async fn test_factory_memory_url() {
    let config = DatabaseConfig {
        database_url: MEMORY_DATABASE_URL.to_string(),
        ..DatabaseConfig::default()
    };
    let store = StorageFactory::create(&config).await.unwrap();
    let handle = store.insert_visit(new_visit("/")).await.unwrap();
    assert_eq!(handle.id(), 1);
}

#[test]
fn test_infer_backend_from_url() {
    assert_eq!(infer_backend_from_url("sqlite://x.db").unwrap(), "sqlite");
    assert_eq!(infer_backend_from_url("postgres://u@h/db").unwrap(), "postgres");
    assert_eq!(infer_backend_from_url("mariadb://u@h/db").unwrap(), "mysql");
    assert!(infer_backend_from_url("redis://localhost").is_err());
}
