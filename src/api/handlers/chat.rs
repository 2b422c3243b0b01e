use actix_web::{HttpResponse, web};

use crate::api::AppState;
use crate::api::helpers::api_result;
use crate::api::types::ChatRequest;

/// `POST /api/chat`
///
/// 网关出错时仍返回 200 和兜底回复，只有消息本身不合法时返回 400。
pub async fn post_chat(state: web::Data<AppState>, body: web::Json<ChatRequest>) -> HttpResponse {
    api_result(state.chat.reply(&body.message).await)
}
