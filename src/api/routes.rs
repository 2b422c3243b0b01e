//! 路由配置

use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::middleware::from_fn;
use actix_web::web;

use super::auth::admin_auth;
use super::handlers::{
    create_visit, get_analytics_report, health_check, ingest_events, post_chat, update_visit,
};
use super::helpers::error_response;
use super::types::ErrorCode;

/// JSON 请求体上限
pub const JSON_LIMIT_BYTES: usize = 256 * 1024;

/// JSON 解析失败时返回统一格式的 400
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err, _req| {
            let response = error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::BadRequest,
                &format!("Invalid JSON body: {}", err),
            );
            InternalError::from_response(err, response).into()
        })
}

/// 公开 API `/api`
///
/// - POST /api/events - 批量写入交互事件
/// - POST /api/visits - 新建页面访问
/// - PATCH /api/visits/{id} - 回填页面访问
/// - POST /api/chat - 聊天回复
/// - GET /api/admin/analytics - 管理端报表
pub fn api_routes() -> actix_web::Scope {
    web::scope("/api")
        .route("/events", web::post().to(ingest_events))
        .route("/visits", web::post().to(create_visit))
        .route("/visits/{id}", web::patch().to(update_visit))
        .route("/chat", web::post().to(post_chat))
        .service(
            web::scope("/admin")
                .wrap(from_fn(admin_auth))
                .route("/analytics", web::get().to(get_analytics_report)),
        )
}

/// 注册全部路由
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/health", web::get().to(health_check))
        .service(api_routes());
}
