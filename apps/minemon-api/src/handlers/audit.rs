//! 审计日志 handlers
//!
//! - GET /audit（manage_users）
//! 查询参数：
//!   - from/to: 可选，毫秒时间戳区间
//!   - limit: 可选，返回数量限制（默认 100）

use crate::AppState;
use crate::middleware::{require_auth_context, require_global_permission};
use crate::utils::response::{audit_log_to_dto, storage_error};
use api_contract::{ApiResponse, AuditLogDto, AuditLogQuery};
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::permissions;

/// 查询审计日志
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<AuditLogQuery>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_USERS).await
    {
        return response;
    }
    let limit = query.limit.unwrap_or(100).max(0);
    match state
        .audit_log_store
        .list_audit_logs(&ctx, query.from, query.to, limit)
        .await
    {
        Ok(items) => {
            let data: Vec<AuditLogDto> = items.into_iter().map(audit_log_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}
