//! API 类型定义

use serde::{Deserialize, Serialize};

use crate::errors::SitepulseError;
use crate::tracking::EventRecord;

/// 统一响应格式 `{code, message, data}`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// API 错误码
///
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: 采集写入错误
/// - 6000-6099: 报表错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    BatchSizeTooLarge = 1010,

    StoreWriteFailed = 3000,
    VisitAlreadyPatched = 3001,

    AnalyticsQueryFailed = 6000,
    AnalyticsInvalidWindow = 6002,
}

impl From<&SitepulseError> for ErrorCode {
    fn from(err: &SitepulseError) -> Self {
        match err {
            SitepulseError::Validation(_) => ErrorCode::BadRequest,
            SitepulseError::NotFound(_) => ErrorCode::NotFound,
            SitepulseError::Conflict(_) => ErrorCode::VisitAlreadyPatched,
            SitepulseError::Unauthorized(_) => ErrorCode::Unauthorized,
            SitepulseError::AnalyticsQueryFailed(_) => ErrorCode::AnalyticsQueryFailed,
            SitepulseError::DatabaseOperation(_) | SitepulseError::StorageUnavailable(_) => {
                ErrorCode::StoreWriteFailed
            }
            _ => ErrorCode::InternalServerError,
        }
    }
}

/// `POST /api/events`
#[derive(Deserialize, Clone, Debug)]
pub struct IngestEventsRequest {
    pub events: Vec<EventRecord>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct IngestEventsResponse {
    pub inserted: usize,
}

/// `POST /api/visits`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VisitCreatedResponse {
    pub id: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VisitUpdatedResponse {
    pub id: i64,
    pub updated: bool,
}

/// `GET /api/admin/analytics`
#[derive(Deserialize, Clone, Debug, Default)]
pub struct AnalyticsQuery {
    /// 7 / 30 / 90，缺省 7
    pub days: Option<u32>,
}

/// `POST /api/chat`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ChatRequest {
    pub message: String,
}

/// `GET /health`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub uptime_secs: i64,
    pub version: String,
}
