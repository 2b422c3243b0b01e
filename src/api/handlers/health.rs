use actix_web::{HttpResponse, web};
use chrono::Utc;
use tracing::trace;

use crate::api::AppState;
use crate::api::helpers::success_response;
use crate::api::types::HealthResponse;

/// `GET /health`
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    trace!("Received health check request");
    success_response(HealthResponse {
        status: "ok".to_string(),
        started_at: state.started_at,
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
