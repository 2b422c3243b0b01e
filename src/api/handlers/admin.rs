use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use tracing::{info, warn};

use crate::analytics::TrailingWindow;
use crate::api::AppState;
use crate::api::helpers::{error_from_sitepulse, error_response, success_response};
use crate::api::types::{AnalyticsQuery, ErrorCode};

/// `GET /api/admin/analytics?days=7|30|90`
pub async fn get_analytics_report(
    state: web::Data<AppState>,
    query: web::Query<AnalyticsQuery>,
) -> HttpResponse {
    let days = query.days.unwrap_or(TrailingWindow::default().days());
    let window = match TrailingWindow::try_from(days) {
        Ok(w) => w,
        Err(e) => {
            warn!("Rejected analytics window: {}", e);
            return error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::AnalyticsInvalidWindow,
                e.message(),
            );
        }
    };

    info!("Admin API: analytics report requested for {}", window);
    match state.analytics.report(window).await {
        Ok(report) => success_response(report),
        Err(e) => error_from_sitepulse(&e),
    }
}
