//! 认证相关 handlers：登录、刷新 token、注销、个人信息、动态路由
//!
//! ## 提供的端点
//!
//! ### 公开端点（无需认证）
//! - `GET /health` `/livez` - 健康检查
//! - `GET /readyz` - 就绪探针（检查 Postgres 连接）
//! - `POST /login` - 以邮箱+口令登录，返回 access/refresh token
//! - `POST /refresh-token` - 使用 refresh token 刷新 access token
//!
//! ### 私有端点（需 Bearer token 认证）
//! - `POST /logout` - 注销（作废 refresh token 绑定）
//! - `GET /me` - 当前用户信息与现场推导的权限
//! - `GET /get-async-routes` - 按权限返回前端路由配置
//!
//! 登录响应中的 roles/permissions 仅供前端渲染菜单与按钮；
//! 后端所有判定都重新走授权闸门，从不信任该副本。

use crate::AppState;
use crate::middleware::require_auth_context;
use crate::utils::response::{access_error, auth_error, internal_auth_error, rbac_user_to_dto};
use api_contract::{
    ApiResponse, AsyncRoute, LoginRequest, LoginResponse, RbacUserDto, RefreshTokenRequest,
    RefreshTokenResponse, RouteMeta,
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::permissions::{self, Scope};
use domain::AuthContext;
use minemon_auth::AuthError;
use minemon_storage::RbacUserRecord;

/// 健康检查端点
pub async fn health() -> impl IntoResponse {
    livez().await
}

/// Liveness 探针：只反映进程存活，不做外部依赖检查。
pub async fn livez() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

/// Readiness 探针：反映关键依赖是否就绪（当前检查 Postgres 连接）。
pub async fn readyz(State(state): State<AppState>) -> Response {
    let Some(pool) = state.db_pool.as_ref() else {
        return (StatusCode::OK, Json(serde_json::json!({ "ok": true }))).into_response();
    };

    match sqlx::query_scalar::<_, i32>("select 1").fetch_one(pool).await {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({ "ok": true }))).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "readyz check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "ok": false })),
            )
                .into_response()
        }
    }
}

/// 现场推导登录响应的权限列表：全局权限 ∪ 各分区覆盖（去重）。
async fn derive_login_permissions(
    state: &AppState,
    ctx: &AuthContext,
) -> Result<Vec<String>, Response> {
    let mut all = match state
        .access
        .effective_permissions(ctx, &ctx.user_id, &Scope::Global)
        .await
    {
        Ok(set) => set,
        Err(err) => return Err(access_error(err)),
    };
    let overrides = match state.rbac_store.list_sector_access(ctx, &ctx.user_id).await {
        Ok(entries) => entries,
        Err(err) => return Err(crate::utils::response::storage_error(err)),
    };
    for entry in overrides {
        all.extend(entry.permissions);
    }
    let mut list: Vec<String> = all.into_iter().collect();
    list.sort();
    Ok(list)
}

/// 登录接口
///
/// 验证邮箱和口令，成功后返回 access token、refresh token 和用户信息。
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    match state.auth.login(&req.email, &req.password).await {
        Ok((user, tokens)) => {
            let ctx = user.to_auth_context();
            let permissions = match derive_login_permissions(&state, &ctx).await {
                Ok(permissions) => permissions,
                Err(response) => return response,
            };
            let response = LoginResponse {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                // 秒级时间戳转毫秒级（前端期望的时间戳格式）
                expires: tokens.expires_at.saturating_mul(1000),
                username: user.username.clone(),
                nickname: user.username,
                avatar: "".to_string(),
                roles: user.role_code.into_iter().collect(),
                permissions,
            };
            (StatusCode::OK, Json(ApiResponse::success(response))).into_response()
        }
        Err(AuthError::InvalidCredentials | AuthError::AccountDisabled) => {
            auth_error(StatusCode::UNAUTHORIZED)
        }
        Err(err) => internal_auth_error(err),
    }
}

/// 刷新 token 接口
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Response {
    match state.auth.refresh(&req.refresh_token).await {
        Ok(tokens) => {
            let response = RefreshTokenResponse {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                expires: tokens.expires_at.saturating_mul(1000),
            };
            (StatusCode::OK, Json(ApiResponse::success(response))).into_response()
        }
        Err(AuthError::TokenInvalid | AuthError::TokenExpired) => {
            auth_error(StatusCode::UNAUTHORIZED)
        }
        Err(err) => internal_auth_error(err),
    }
}

/// 注销接口：作废 refresh token 绑定
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    match state.auth.logout(&ctx).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::success(()))).into_response(),
        Err(err) => internal_auth_error(err),
    }
}

/// 当前用户信息
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    let user = match state.user_store.find_user(&ctx, &ctx.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return auth_error(StatusCode::UNAUTHORIZED),
        Err(err) => return crate::utils::response::storage_error(err),
    };
    let dto: RbacUserDto = rbac_user_to_dto(RbacUserRecord {
        user_id: user.user_id,
        username: user.username,
        email: user.email,
        status: user.status,
        role_code: user.role_code,
    });
    (StatusCode::OK, Json(ApiResponse::success(dto))).into_response()
}

/// 动态路由接口：按现场推导的全局权限裁剪前端菜单
pub async fn get_async_routes(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    let effective = match state
        .access
        .effective_permissions(&ctx, &ctx.user_id, &Scope::Global)
        .await
    {
        Ok(set) => set,
        Err(err) => return access_error(err),
    };

    let mut routes = Vec::new();
    if effective.contains(permissions::VIEW_ALL_MINES) {
        routes.push(route("/mines", "Mines", "Layout", "Mines", "mine", 1));
    }
    if effective.contains(permissions::VIEW_ALERTS) {
        routes.push(route("/alerts", "Alerts", "Layout", "Alerts", "bell", 2));
    }
    if effective.contains(permissions::VIEW_REPORTS) {
        routes.push(route("/reports", "Reports", "Layout", "Reports", "chart", 3));
    }
    if effective.contains(permissions::ACCESS_MESSAGING) {
        routes.push(route("/messages", "Inbox", "Layout", "Inbox", "mail", 4));
    }
    if effective.contains(permissions::MANAGE_USERS) {
        routes.push(route("/rbac", "Access", "Layout", "Access", "lock", 5));
    }

    (StatusCode::OK, Json(ApiResponse::success(routes))).into_response()
}

fn route(
    path: &str,
    name: &str,
    component: &str,
    title: &str,
    icon: &str,
    rank: i32,
) -> AsyncRoute {
    AsyncRoute {
        path: path.to_string(),
        name: name.to_string(),
        component: component.to_string(),
        meta: RouteMeta {
            title: title.to_string(),
            icon: icon.to_string(),
            rank,
            roles: None,
            auths: None,
        },
        children: Vec::new(),
    }
}
