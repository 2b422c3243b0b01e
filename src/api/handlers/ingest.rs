//! 采集写入端点
//!
//! 浏览器端的事件批次和页面访问通过这里落库。写入失败只返回错误，
//! 客户端按至多一次语义处理，不会重试。

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use tracing::{debug, warn};

use crate::api::AppState;
use crate::api::helpers::{error_response, success_response};
use crate::api::types::{
    ErrorCode, IngestEventsRequest, IngestEventsResponse, VisitCreatedResponse,
    VisitUpdatedResponse,
};
use crate::errors::SitepulseError;
use crate::tracking::{NewVisit, VisitHandle, VisitUpdate};

/// 单个请求允许的最大事件数
pub const MAX_EVENTS_PER_BATCH: usize = 500;

pub async fn ingest_events(
    state: web::Data<AppState>,
    body: web::Json<IngestEventsRequest>,
) -> HttpResponse {
    let events = body.into_inner().events;

    if events.is_empty() {
        return success_response(IngestEventsResponse { inserted: 0 });
    }
    if events.len() > MAX_EVENTS_PER_BATCH {
        return error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::BatchSizeTooLarge,
            &format!(
                "Batch of {} events exceeds the limit of {}",
                events.len(),
                MAX_EVENTS_PER_BATCH
            ),
        );
    }
    if let Some(bad) = events.iter().find(|e| e.session_id.as_str().is_empty()) {
        return error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &format!("Event {} is missing session_id", bad.event.event_type),
        );
    }

    let count = events.len();
    match state.store.insert_events(events).await {
        Ok(()) => {
            debug!("Ingested {} interaction events", count);
            success_response(IngestEventsResponse { inserted: count })
        }
        Err(e) => {
            warn!("Failed to ingest {} events: {}", count, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::StoreWriteFailed,
                "Failed to store events",
            )
        }
    }
}

pub async fn create_visit(state: web::Data<AppState>, body: web::Json<NewVisit>) -> HttpResponse {
    let mut visit = body.into_inner();
    visit.referrer = visit.referrer.filter(|r| !r.is_empty());
    if visit.session_id.as_str().is_empty() || visit.page_path.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "session_id and page_path are required",
        );
    }

    match state.store.insert_visit(visit).await {
        Ok(handle) => success_response(VisitCreatedResponse { id: handle.id() }),
        Err(e) => {
            warn!("Failed to record visit: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::StoreWriteFailed,
                "Failed to store visit",
            )
        }
    }
}

pub async fn update_visit(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<VisitUpdate>,
) -> HttpResponse {
    let id = path.into_inner();
    let update = body.into_inner();

    if update.scroll_depth > 100 {
        return error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "scroll_depth must be between 0 and 100",
        );
    }

    match state.store.update_visit(VisitHandle::new(id), update).await {
        Ok(()) => success_response(VisitUpdatedResponse { id, updated: true }),
        // 未找到或已回填过
        Err(e) => match e.downcast_ref::<SitepulseError>() {
            Some(err @ (SitepulseError::NotFound(_) | SitepulseError::Conflict(_))) => {
                debug!("Rejected update for visit {}: {}", id, err);
                error_response(err.http_status(), ErrorCode::from(err), err.message())
            }
            _ => {
                warn!("Failed to update visit {}: {}", id, e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::StoreWriteFailed,
                    "Failed to update visit",
                )
            }
        },
    }
}
