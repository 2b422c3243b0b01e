use sea_orm::ActiveValue::{NotSet, Set};
use serde_json::{Map, Value};
use tracing::warn;

use crate::identity::{Fingerprint, SessionId};
use crate::tracking::{EventRecord, EventType, NewEvent, NewVisit, StoredEvent, VisitRecord};

use migration::entities::{interaction_event, visitor_analytics};

/// 事件行 -> ActiveModel（created_at 使用写入时间）
pub fn event_to_active_model(
    record: EventRecord,
    now: chrono::DateTime<chrono::Utc>,
) -> interaction_event::ActiveModel {
    let metadata = if record.event.metadata.is_empty() {
        None
    } else {
        serde_json::to_string(&record.event.metadata).ok()
    };

    interaction_event::ActiveModel {
        id: NotSet,
        session_id: Set(record.session_id.to_string()),
        fingerprint: Set(record.fingerprint.map(|fp| fp.to_string())),
        event_type: Set(record.event.event_type.into()),
        element_id: Set(record.event.element_id),
        element_type: Set(record.event.element_type),
        page_x: Set(record.event.page_x),
        page_y: Set(record.event.page_y),
        page_path: Set(record.page_path),
        project_id: Set(record.event.project_id),
        metadata: Set(metadata),
        created_at: Set(now),
    }
}

pub fn model_to_stored_event(model: interaction_event::Model) -> StoredEvent {
    let metadata = match model.metadata.as_deref() {
        None | Some("") => Map::new(),
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!("Event {} has unreadable metadata, ignoring it", model.id);
                Map::new()
            }
        },
    };

    StoredEvent {
        id: model.id,
        record: EventRecord {
            session_id: SessionId::from(model.session_id),
            fingerprint: model.fingerprint.map(Fingerprint::from),
            page_path: model.page_path,
            event: NewEvent {
                event_type: EventType::from(model.event_type),
                element_id: model.element_id,
                element_type: model.element_type,
                page_x: model.page_x,
                page_y: model.page_y,
                project_id: model.project_id,
                metadata,
            },
        },
        created_at: model.created_at,
    }
}

/// 新访问 -> ActiveModel，统计列从 0 开始
pub fn visit_to_active_model(
    visit: NewVisit,
    now: chrono::DateTime<chrono::Utc>,
) -> visitor_analytics::ActiveModel {
    visitor_analytics::ActiveModel {
        id: NotSet,
        session_id: Set(visit.session_id.to_string()),
        fingerprint: Set(visit.fingerprint.map(|fp| fp.to_string())),
        page_path: Set(visit.page_path),
        device_type: Set(visit.device_type.as_ref().to_string()),
        referrer: Set(visit.referrer),
        scroll_depth: Set(0),
        time_on_page: Set(0),
        clicks: Set(0),
        created_at: Set(now),
        patched_at: Set(None),
    }
}

pub fn model_to_visit_record(model: visitor_analytics::Model) -> VisitRecord {
    VisitRecord {
        id: model.id,
        session_id: model.session_id,
        fingerprint: model.fingerprint,
        page_path: model.page_path,
        device_type: model.device_type,
        referrer: model.referrer,
        scroll_depth: model.scroll_depth,
        time_on_page: model.time_on_page,
        clicks: model.clicks,
        created_at: model.created_at,
    }
}
