//! 管理端 Bearer 令牌校验

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::middleware::Next;
use actix_web::{Error, HttpResponse, web};
use subtle::ConstantTimeEq;
use tracing::{debug, info, trace};

use super::AppState;
use super::helpers::error_response;
use super::types::ErrorCode;

/// 从 Authorization header 提取 Bearer token
fn extract_bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
}

/// 常量时间比较，长度不同直接失败
pub fn token_matches(expected: &str, provided: &str) -> bool {
    bool::from(expected.as_bytes().ct_eq(provided.as_bytes()))
}

/// 管理端鉴权中间件
///
/// 未配置令牌时整个管理端返回 404。
pub async fn admin_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let expected = req
        .app_data::<web::Data<AppState>>()
        .map(|state| state.admin_token.clone())
        .unwrap_or_default();

    if expected.is_empty() {
        debug!("Admin token not configured - returning 404");
        let response = HttpResponse::NotFound()
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .body("Not Found");
        return Ok(req.into_response(response).map_into_right_body());
    }

    let authorized = extract_bearer_token(&req).is_some_and(|t| token_matches(&expected, t));
    if !authorized {
        info!("Admin authentication failed - invalid or missing token");
        let response = error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized,
            "Unauthorized: Invalid or missing token",
        );
        return Ok(req.into_response(response).map_into_right_body());
    }

    trace!("Admin bearer token accepted");
    next.call(req).await.map(ServiceResponse::map_into_left_body)
}
