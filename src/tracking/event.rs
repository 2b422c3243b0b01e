//! 交互事件模型

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identity::{Fingerprint, SessionId};

/// 事件类型
///
/// 站点固定使用的几种类型之外，允许任意自定义字符串。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Click,
    ProjectView,
    ServiceClick,
    WhatsappClick,
    CtaClick,
    FormSubmit,
    Custom(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::ProjectView => "project_view",
            Self::ServiceClick => "service_click",
            Self::WhatsappClick => "whatsapp_click",
            Self::CtaClick => "cta_click",
            Self::FormSubmit => "form_submit",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for EventType {
    fn from(value: &str) -> Self {
        match value {
            "click" => Self::Click,
            "project_view" => Self::ProjectView,
            "service_click" => Self::ServiceClick,
            "whatsapp_click" => Self::WhatsappClick,
            "cta_click" => Self::CtaClick,
            "form_submit" => Self::FormSubmit,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        match value {
            EventType::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 调用方提交的事件（尚未绑定页面和身份）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl NewEvent {
    pub fn new(event_type: impl Into<EventType>) -> Self {
        Self {
            event_type: event_type.into(),
            element_id: None,
            element_type: None,
            page_x: None,
            page_y: None,
            project_id: None,
            metadata: Map::new(),
        }
    }

    pub fn with_element(mut self, id: impl Into<String>, element_type: impl Into<String>) -> Self {
        self.element_id = Some(id.into());
        self.element_type = Some(element_type.into());
        self
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.page_x = Some(x);
        self.page_y = Some(y);
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// 写入存储的事件行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub session_id: SessionId,
    #[serde(default)]
    pub fingerprint: Option<Fingerprint>,
    pub page_path: String,
    #[serde(flatten)]
    pub event: NewEvent,
}

/// 从存储读回的事件行，created_at 由存储端写入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: i64,
    #[serde(flatten)]
    pub record: EventRecord,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_string_mapping() {
        assert_eq!(EventType::from("project_view"), EventType::ProjectView);
        assert_eq!(EventType::WhatsappClick.as_str(), "whatsapp_click");
        assert_eq!(
            EventType::from("newsletter_signup"),
            EventType::Custom("newsletter_signup".to_string())
        );
        assert_eq!(String::from(EventType::ServiceClick), "service_click");
    }

    #[test]
    fn test_event_record_json_shape() {
        let record = EventRecord {
            session_id: SessionId::from("1700000000000-abc123def"),
            fingerprint: Some(Fingerprint::from("2b5c4")),
            page_path: "/services".to_string(),
            event: NewEvent::new(EventType::ServiceClick)
                .with_element("card-web", "article")
                .with_metadata("category", "web"),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["event_type"], "service_click");
        assert_eq!(json["session_id"], "1700000000000-abc123def");
        assert_eq!(json["metadata"]["category"], "web");
        assert!(json.get("page_x").is_none());

        let back: EventRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_event_record_accepts_minimal_payload() {
        let record: EventRecord = serde_json::from_str(
            r#"{"session_id":"s","page_path":"/","event_type":"click"}"#,
        )
        .unwrap();
        assert_eq!(record.event.event_type, EventType::Click);
        assert!(record.fingerprint.is_none());
        assert!(record.event.metadata.is_empty());
    }
}
