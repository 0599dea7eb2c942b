//! 站内消息 handlers（收件箱）
//!
//! - GET /messages - 收件箱列表（access_messaging）
//! - POST /messages - 发送消息（access_messaging；收件人必须存在）
//! - POST /messages/{id}/read - 标记已读（幂等）
//! - GET /messages/unread-count - 未读数

use crate::AppState;
use crate::middleware::{require_auth_context, require_global_permission};
use crate::utils::normalize_required;
use crate::utils::response::{bad_request_error, message_to_dto, not_found_error, storage_error};
use api_contract::{ApiResponse, MessageDto, MessagesQuery, SendMessageRequest};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::permissions;
use minemon_telemetry::record_message_sent;
use uuid::Uuid;

#[derive(serde::Deserialize)]
pub struct MessagePath {
    pub(crate) message_id: String,
}

/// 收件箱列表
pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<MessagesQuery>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) =
        require_global_permission(&state, &ctx, permissions::ACCESS_MESSAGING).await
    {
        return response;
    }
    let limit = query.limit.unwrap_or(100);
    if limit <= 0 || limit > 1000 {
        return bad_request_error("limit out of range");
    }
    match state
        .message_store
        .list_inbox(&ctx, &ctx.user_id, query.unread_only.unwrap_or(false), limit)
        .await
    {
        Ok(items) => {
            let data: Vec<MessageDto> = items.into_iter().map(message_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 发送消息
pub async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) =
        require_global_permission(&state, &ctx, permissions::ACCESS_MESSAGING).await
    {
        return response;
    }
    let recipient_id = match normalize_required(req.recipient_id, "recipientId") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let subject = match normalize_required(req.subject, "subject") {
        Ok(value) => value,
        Err(response) => return response,
    };
    if req.body.trim().is_empty() {
        return bad_request_error("body required");
    }
    match state.user_store.find_user(&ctx, &recipient_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return bad_request_error("recipient not found"),
        Err(err) => return storage_error(err),
    }

    let record = minemon_storage::MessageRecord {
        message_id: Uuid::new_v4().to_string(),
        sender_id: ctx.user_id.clone(),
        sender_name: ctx.username.clone(),
        recipient_id,
        subject,
        body: req.body,
        sent_at_ms: super::rbac::now_epoch_ms(),
        read: false,
    };
    match state.message_store.send_message(&ctx, record).await {
        Ok(sent) => {
            record_message_sent();
            (
                StatusCode::OK,
                Json(ApiResponse::success(message_to_dto(sent))),
            )
                .into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 标记已读（只有收件人本人可标记；重复标记是空操作）
pub async fn mark_message_read(
    State(state): State<AppState>,
    Path(path): Path<MessagePath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) =
        require_global_permission(&state, &ctx, permissions::ACCESS_MESSAGING).await
    {
        return response;
    }
    match state
        .message_store
        .mark_read(&ctx, &ctx.user_id, &path.message_id)
        .await
    {
        Ok(Some(updated)) => (
            StatusCode::OK,
            Json(ApiResponse::success(message_to_dto(updated))),
        )
            .into_response(),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 未读数
pub async fn unread_count(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) =
        require_global_permission(&state, &ctx, permissions::ACCESS_MESSAGING).await
    {
        return response;
    }
    match state.message_store.unread_count(&ctx, &ctx.user_id).await {
        Ok(count) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({ "unread": count }))),
        )
            .into_response(),
        Err(err) => storage_error(err),
    }
}
