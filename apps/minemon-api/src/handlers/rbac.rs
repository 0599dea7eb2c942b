//! RBAC 管理面接口
//!
//! 用户、角色、权限目录与分区访问覆盖的管理；全部需要 manage_users。
//!
//! 结构性保护：删除用户、变更用户角色、停用用户前都先过
//! ensure_not_last_admin——最后一名 admin 的删除/降级/停用被拒绝，
//! 返回与普通 403 不同的错误码，与操作者自身权限无关。
//!
//! 管理面变更全部写入审计日志。

use crate::AppState;
use crate::middleware::{require_auth_context, require_global_permission};
use crate::utils::response::{
    access_error, bad_request_error, internal_auth_error, not_found_error, rbac_user_to_dto,
    role_to_dto, storage_error,
};
use crate::utils::{normalize_optional, normalize_required, validate_choice};
use api_contract::{
    ApiResponse, CreateRbacRoleRequest, CreateRbacUserRequest, GrantSectorAccessRequest,
    PermissionDto, RbacRoleDto, RbacUserDto, SectorAccessDto, SetRolePermissionsRequest,
    SetUserRoleRequest, UpdateRbacUserRequest,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::AuthContext;
use domain::permissions;
use minemon_auth::hash_password;
use uuid::Uuid;

const USER_STATUSES: &[&str] = &["active", "inactive"];

#[derive(Debug, serde::Deserialize)]
pub struct UserPath {
    pub user_id: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct RolePath {
    pub role_code: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct SectorAccessPath {
    pub user_id: String,
    pub mine_id: String,
    pub sector_id: String,
}

/// 追加审计记录；审计失败不阻断业务，仅告警。
pub(crate) async fn append_audit(state: &AppState, ctx: &AuthContext, action: &str, detail: String) {
    let record = minemon_storage::AuditLogRecord {
        audit_id: Uuid::new_v4().to_string(),
        user_id: ctx.user_id.clone(),
        action: action.to_string(),
        detail,
        ts_ms: now_epoch_ms(),
    };
    if let Err(err) = state.audit_log_store.append_audit(ctx, record).await {
        tracing::warn!(target: "minemon.audit", error = %err, action = %action, "audit_append_failed");
    }
}

pub(crate) fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// 列出用户
pub async fn list_rbac_users(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_USERS).await
    {
        return response;
    }
    match state.rbac_store.list_users(&ctx).await {
        Ok(items) => {
            let items = items.into_iter().map(rbac_user_to_dto).collect::<Vec<_>>();
            (StatusCode::OK, Json(ApiResponse::success(items))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 创建用户
pub async fn create_rbac_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateRbacUserRequest>,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_USERS).await
    {
        return response;
    }

    let username = match normalize_required(req.username, "username") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let email = match normalize_required(req.email, "email") {
        Ok(value) => value,
        Err(response) => return response,
    };
    if req.password.trim().is_empty() {
        return bad_request_error("password is required");
    }
    let status = match req.status {
        Some(status) => match validate_choice(status, "status", USER_STATUSES) {
            Ok(value) => value,
            Err(response) => return response,
        },
        None => "active".to_string(),
    };
    let role_code = match normalize_optional(req.role, "role") {
        Ok(value) => value,
        Err(response) => return response,
    };
    if let Some(role_code) = role_code.as_deref() {
        match state.rbac_store.find_role(&ctx, role_code).await {
            Ok(Some(_)) => {}
            Ok(None) => return bad_request_error(format!("unknown role: {role_code}")),
            Err(err) => return storage_error(err),
        }
    }
    let password_hash = match hash_password(&req.password) {
        Ok(value) => value,
        Err(err) => return internal_auth_error(err),
    };

    let record = minemon_storage::RbacUserCreate {
        user_id: Uuid::new_v4().to_string(),
        username,
        email,
        password: password_hash,
        status,
        role_code,
    };
    match state.rbac_store.create_user(&ctx, record).await {
        Ok(created) => {
            append_audit(
                &state,
                &ctx,
                "user.create",
                format!("created user {} <{}>", created.username, created.email),
            )
            .await;
            (
                StatusCode::OK,
                Json(ApiResponse::success(rbac_user_to_dto(created))),
            )
                .into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 更新用户（口令/状态）
///
/// 停用是一种降级：目标为最后一名 admin 时拒绝。
pub async fn update_rbac_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(path): Path<UserPath>,
    Json(req): Json<UpdateRbacUserRequest>,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_USERS).await
    {
        return response;
    }

    if req.password.is_none() && req.status.is_none() {
        return bad_request_error("no fields to update");
    }
    let status = match req.status {
        Some(status) => match validate_choice(status, "status", USER_STATUSES) {
            Ok(value) => Some(value),
            Err(response) => return response,
        },
        None => None,
    };
    if status.as_deref() == Some("inactive") {
        if let Err(err) = state.access.ensure_not_last_admin(&ctx, &path.user_id).await {
            return access_error(err);
        }
    }

    let password_hash = match req.password {
        None => None,
        Some(password) => {
            if password.trim().is_empty() {
                return bad_request_error("password is required");
            }
            match hash_password(&password) {
                Ok(value) => Some(value),
                Err(err) => return internal_auth_error(err),
            }
        }
    };

    match state
        .rbac_store
        .update_user(
            &ctx,
            &path.user_id,
            minemon_storage::RbacUserUpdate {
                password: password_hash,
                status,
            },
        )
        .await
    {
        Ok(Some(updated)) => {
            append_audit(
                &state,
                &ctx,
                "user.update",
                format!("updated user {}", updated.user_id),
            )
            .await;
            (
                StatusCode::OK,
                Json(ApiResponse::success(rbac_user_to_dto(updated))),
            )
                .into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 删除用户（最后一名 admin 受保护）
pub async fn delete_rbac_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(path): Path<UserPath>,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_USERS).await
    {
        return response;
    }
    if let Err(err) = state.access.ensure_not_last_admin(&ctx, &path.user_id).await {
        return access_error(err);
    }
    match state.rbac_store.delete_user(&ctx, &path.user_id).await {
        Ok(true) => {
            append_audit(
                &state,
                &ctx,
                "user.delete",
                format!("deleted user {}", path.user_id),
            )
            .await;
            (StatusCode::OK, Json(ApiResponse::success(()))).into_response()
        }
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 设置/撤销用户角色（最后一名 admin 不可降级）
pub async fn set_rbac_user_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(path): Path<UserPath>,
    Json(req): Json<SetUserRoleRequest>,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_USERS).await
    {
        return response;
    }
    let role_code = match normalize_optional(req.role, "role") {
        Ok(value) => value,
        Err(response) => return response,
    };
    if let Some(role_code) = role_code.as_deref() {
        match state.rbac_store.find_role(&ctx, role_code).await {
            Ok(Some(_)) => {}
            Ok(None) => return bad_request_error(format!("unknown role: {role_code}")),
            Err(err) => return storage_error(err),
        }
    }
    // 摘掉 admin 角色属于降级，受最后管理员保护
    if role_code.as_deref() != Some(permissions::ROLE_ADMIN) {
        if let Err(err) = state.access.ensure_not_last_admin(&ctx, &path.user_id).await {
            return access_error(err);
        }
    }
    match state
        .rbac_store
        .set_user_role(&ctx, &path.user_id, role_code.clone())
        .await
    {
        Ok(Some(updated)) => {
            append_audit(
                &state,
                &ctx,
                "user.set_role",
                format!(
                    "set role of user {} to {}",
                    path.user_id,
                    role_code.as_deref().unwrap_or("<none>")
                ),
            )
            .await;
            (
                StatusCode::OK,
                Json(ApiResponse::success(rbac_user_to_dto(updated))),
            )
                .into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 列出角色
pub async fn list_rbac_roles(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_USERS).await
    {
        return response;
    }
    match state.rbac_store.list_roles(&ctx).await {
        Ok(items) => {
            let items = items.into_iter().map(role_to_dto).collect::<Vec<_>>();
            (StatusCode::OK, Json(ApiResponse::success(items))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 创建角色（权限码必须属于全局命名空间）
pub async fn create_rbac_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateRbacRoleRequest>,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_USERS).await
    {
        return response;
    }

    let role_code = match normalize_required(req.role_code, "roleCode") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let name = match normalize_required(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let codes = req.permissions.unwrap_or_default();
    for code in &codes {
        if !permissions::is_global_permission(code) {
            return bad_request_error(format!("unknown permission: {code}"));
        }
    }

    let record = minemon_storage::RoleCreate {
        role_code: role_code.clone(),
        name,
        permissions: codes,
    };
    match state.rbac_store.create_role(&ctx, record).await {
        Ok(created) => {
            append_audit(
                &state,
                &ctx,
                "role.create",
                format!("created role {role_code}"),
            )
            .await;
            (
                StatusCode::OK,
                Json(ApiResponse::success(role_to_dto(created))),
            )
                .into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 删除角色
pub async fn delete_rbac_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(path): Path<RolePath>,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_USERS).await
    {
        return response;
    }
    // admin 角色本身不可删除，否则保护不变量失去意义
    if path.role_code == permissions::ROLE_ADMIN {
        return bad_request_error("the admin role cannot be deleted");
    }
    match state.rbac_store.delete_role(&ctx, &path.role_code).await {
        Ok(true) => {
            append_audit(
                &state,
                &ctx,
                "role.delete",
                format!("deleted role {}", path.role_code),
            )
            .await;
            (StatusCode::OK, Json(ApiResponse::success(()))).into_response()
        }
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 原子替换角色权限集（对所有持有者即时生效）
pub async fn set_rbac_role_permissions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(path): Path<RolePath>,
    Json(req): Json<SetRolePermissionsRequest>,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_USERS).await
    {
        return response;
    }
    match state
        .access
        .update_role_permissions(&ctx, &path.role_code, req.permissions)
        .await
    {
        Ok(Some(updated)) => {
            append_audit(
                &state,
                &ctx,
                "role.set_permissions",
                format!(
                    "replaced permissions of role {} ({} codes)",
                    path.role_code,
                    updated.permissions.len()
                ),
            )
            .await;
            (
                StatusCode::OK,
                Json(ApiResponse::success(role_to_dto(updated))),
            )
                .into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => access_error(err),
    }
}

/// 权限目录
pub async fn list_rbac_permissions(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_USERS).await
    {
        return response;
    }
    match state.rbac_store.list_permissions(&ctx).await {
        Ok(items) => {
            let items = items
                .into_iter()
                .map(|item| PermissionDto {
                    permission_code: item.permission_code,
                    description: item.description,
                })
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(ApiResponse::success(items))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 列出用户的分区访问覆盖
pub async fn list_sector_access(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(path): Path<UserPath>,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_USERS).await
    {
        return response;
    }
    match state.rbac_store.list_sector_access(&ctx, &path.user_id).await {
        Ok(items) => {
            let items = items
                .into_iter()
                .map(|item| SectorAccessDto {
                    mine_id: item.mine_id,
                    sector_id: item.sector_id,
                    permissions: item.permissions,
                })
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(ApiResponse::success(items))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 授予分区访问覆盖（(user, mine, sector) 唯一，重复授予整体替换）
pub async fn grant_sector_access(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(path): Path<UserPath>,
    Json(req): Json<GrantSectorAccessRequest>,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_USERS).await
    {
        return response;
    }
    // 目标用户与分区都必须存在
    match state.user_store.find_user(&ctx, &path.user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    }
    match state
        .sector_store
        .find_sector(&ctx, &req.mine_id, &req.sector_id)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => return bad_request_error("sector not found"),
        Err(err) => return storage_error(err),
    }
    match state
        .access
        .grant_sector_access(
            &ctx,
            minemon_storage::SectorAccessRecord {
                user_id: path.user_id.clone(),
                mine_id: req.mine_id.clone(),
                sector_id: req.sector_id.clone(),
                permissions: req.permissions,
            },
        )
        .await
    {
        Ok(granted) => {
            append_audit(
                &state,
                &ctx,
                "sector_access.grant",
                format!(
                    "granted sector access ({}, {}) to user {}",
                    req.mine_id, req.sector_id, path.user_id
                ),
            )
            .await;
            (
                StatusCode::OK,
                Json(ApiResponse::success(SectorAccessDto {
                    mine_id: granted.mine_id,
                    sector_id: granted.sector_id,
                    permissions: granted.permissions,
                })),
            )
                .into_response()
        }
        Err(err) => access_error(err),
    }
}

/// 撤销分区访问覆盖
pub async fn revoke_sector_access(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(path): Path<SectorAccessPath>,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_USERS).await
    {
        return response;
    }
    match state
        .rbac_store
        .revoke_sector_access(&ctx, &path.user_id, &path.mine_id, &path.sector_id)
        .await
    {
        Ok(true) => {
            append_audit(
                &state,
                &ctx,
                "sector_access.revoke",
                format!(
                    "revoked sector access ({}, {}) from user {}",
                    path.mine_id, path.sector_id, path.user_id
                ),
            )
            .await;
            (StatusCode::OK, Json(ApiResponse::success(()))).into_response()
        }
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};
    use minemon_access::AccessControl;
    use minemon_auth::{AuthService, JwtManager};
    use minemon_monitoring::{AlertGenerator, AlertPolicy, MonitoringService, ThresholdTable};
    use std::sync::Arc;

    fn build_state() -> AppState {
        let user_store: Arc<minemon_storage::InMemoryUserStore> =
            Arc::new(minemon_storage::InMemoryUserStore::with_default_admin());
        let jwt = JwtManager::new("secret".to_string(), 3600, 3600);
        let auth: Arc<AuthService> = Arc::new(AuthService::new(user_store.clone(), jwt));
        let access = Arc::new(AccessControl::new(user_store.clone(), user_store.clone()));
        let rbac_store: Arc<dyn minemon_storage::RbacStore> = user_store.clone();

        let alert_store: Arc<dyn minemon_storage::AlertStore> =
            Arc::new(minemon_storage::InMemoryAlertStore::new());
        let realtime_store: Arc<dyn minemon_storage::RealtimeStore> =
            Arc::new(minemon_storage::InMemoryRealtimeStore::new());
        let thresholds = ThresholdTable::defaults();
        let monitoring = Arc::new(MonitoringService::new(
            thresholds.clone(),
            realtime_store.clone(),
            AlertGenerator::new(alert_store.clone(), AlertPolicy::default()),
        ));

        AppState {
            auth,
            access,
            db_pool: None,
            user_store,
            rbac_store,
            mine_store: Arc::new(minemon_storage::InMemoryMineStore::with_default_mine()),
            sector_store: Arc::new(minemon_storage::InMemorySectorStore::new()),
            sensor_store: Arc::new(minemon_storage::InMemorySensorStore::new()),
            alert_store,
            message_store: Arc::new(minemon_storage::InMemoryMessageStore::new()),
            realtime_store,
            audit_log_store: Arc::new(minemon_storage::InMemoryAuditLogStore::new()),
            monitoring,
            thresholds,
        }
    }

    fn bearer_headers(user_id: &str, username: &str) -> HeaderMap {
        let jwt = JwtManager::new("secret".to_string(), 3600, 3600);
        let tokens = jwt
            .issue_tokens(&AuthContext::new(user_id, username, None))
            .expect("token");
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", tokens.access_token)).expect("header"),
        );
        headers
    }

    #[tokio::test]
    async fn list_users_requires_permission() {
        let state = build_state();
        // 存储中不存在的用户：有效 token，但推导出的权限是空集
        let headers = bearer_headers("ghost", "ghost");
        let response = list_rbac_users(State(state), headers).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn sole_admin_delete_is_blocked() {
        let state = build_state();
        let headers = bearer_headers("user-1", "admin");
        let response = delete_rbac_user(
            State(state),
            headers,
            Path(UserPath {
                user_id: "user-1".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn second_admin_makes_delete_possible() {
        let state = build_state();
        let ctx = AuthContext::new("user-1", "admin", None);
        state
            .rbac_store
            .create_user(
                &ctx,
                minemon_storage::RbacUserCreate {
                    user_id: "user-2".to_string(),
                    username: "admin-2".to_string(),
                    email: "admin-2@minemon.local".to_string(),
                    password: "hash".to_string(),
                    status: "active".to_string(),
                    role_code: Some(permissions::ROLE_ADMIN.to_string()),
                },
            )
            .await
            .expect("user");

        let headers = bearer_headers("user-1", "admin");
        let response = delete_rbac_user(
            State(state),
            headers,
            Path(UserPath {
                user_id: "user-2".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn demoting_sole_admin_is_blocked() {
        let state = build_state();
        let headers = bearer_headers("user-1", "admin");
        let response = set_rbac_user_role(
            State(state),
            headers,
            Path(UserPath {
                user_id: "user-1".to_string(),
            }),
            Json(SetUserRoleRequest { role: None }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_role_itself_cannot_be_deleted() {
        let state = build_state();
        let headers = bearer_headers("user-1", "admin");
        let response = delete_rbac_role(
            State(state),
            headers,
            Path(RolePath {
                role_code: permissions::ROLE_ADMIN.to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
