//! 认证和授权中间件
//!
//! 提供以下中间件和辅助函数：
//! - request_context：请求上下文中间件，注入 request_id/trace_id
//! - bearer_token：从 Authorization 头提取 Bearer token
//! - require_auth_context：验证 token 并提取执行上下文
//! - require_mine_scope：验证矿井存在并绑定作用域
//! - require_global_permission / require_sector_permission：授权闸门入口
//!
//! 认证流程：
//! 1. request_context：在所有请求前注入追踪 ID
//! 2. bearer_token：从请求头提取 token
//! 3. require_auth_context：验证 JWT 签名，获取 AuthContext（只含身份）
//! 4. require_*_permission：按作用域现场推导有效权限并判定

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use domain::permissions::Scope;
use domain::AuthContext;
use minemon_auth::AuthError;
use minemon_telemetry::{new_request_ids, record_authz_check, record_authz_denied};
use tracing::{Instrument, info_span};

use crate::AppState;
use crate::utils::response::{access_error, auth_error, forbidden_error, not_found_error, storage_error};

/// 请求上下文中间件：注入 request_id/trace_id
pub async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response: axum::response::Response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}

/// 从请求头中提取 Bearer token
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header_value = headers.get(header::AUTHORIZATION)?;
    let auth_str = header_value.to_str().ok()?;
    auth_str.strip_prefix("Bearer ")
}

/// 验证并提取执行上下文
pub fn require_auth_context(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthContext, Response> {
    let token = match bearer_token(headers) {
        Some(token) => token,
        None => return Err(auth_error(axum::http::StatusCode::UNAUTHORIZED)),
    };
    match state.auth.verify_access_token(token) {
        Ok(ctx) => Ok(ctx),
        Err(AuthError::TokenInvalid | AuthError::TokenExpired) => {
            Err(auth_error(axum::http::StatusCode::UNAUTHORIZED))
        }
        Err(err) => Err(crate::utils::response::internal_auth_error(err)),
    }
}

/// 验证矿井存在并绑定作用域
pub async fn require_mine_scope(
    state: &AppState,
    headers: &HeaderMap,
    mine_id: &str,
) -> Result<AuthContext, Response> {
    let mut ctx = match require_auth_context(state, headers) {
        Ok(ctx) => ctx,
        Err(response) => return Err(response),
    };
    match state.mine_store.mine_exists(&ctx, mine_id).await {
        Ok(true) => {
            ctx.mine_scope = Some(mine_id.to_string());
            Ok(ctx)
        }
        Ok(false) => Err(not_found_error()),
        Err(err) => Err(storage_error(err)),
    }
}

/// 全局作用域授权判定
pub async fn require_global_permission(
    state: &AppState,
    ctx: &AuthContext,
    permission: &str,
) -> Result<(), Response> {
    require_permission_in_scope(state, ctx, permission, &Scope::Global).await
}

/// 分区作用域授权判定
pub async fn require_sector_permission(
    state: &AppState,
    ctx: &AuthContext,
    permission: &str,
    mine_id: &str,
    sector_id: &str,
) -> Result<(), Response> {
    require_permission_in_scope(state, ctx, permission, &Scope::sector(mine_id, sector_id)).await
}

async fn require_permission_in_scope(
    state: &AppState,
    ctx: &AuthContext,
    permission: &str,
    scope: &Scope,
) -> Result<(), Response> {
    record_authz_check();
    match state.access.authorize(ctx, &ctx.user_id, permission, scope).await {
        Ok(true) => Ok(()),
        Ok(false) => {
            record_authz_denied();
            Err(forbidden_error())
        }
        Err(err) => Err(access_error(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::bearer_token;
    use axum::http::{HeaderMap, HeaderValue, header};

    #[test]
    fn bearer_token_extracts() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer token-1"),
        );
        assert_eq!(bearer_token(&headers), Some("token-1"));
    }

    #[test]
    fn missing_or_malformed_header_yields_none() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }
}
