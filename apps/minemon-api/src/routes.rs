//! 路由定义
//!
//! 集中管理所有 API 路由，将路径映射到对应的 handlers。
//! 路由包括：
//! - 健康检查：/health /livez /readyz
//! - 认证接口：/login /refresh-token /logout /me /get-async-routes
//! - 矿井管理：/mines/*
//! - 分区管理：/mines/{id}/sectors/*
//! - 传感器管理：/mines/{id}/sectors/{sid}/sensors/*
//! - 实时状态：/overview /mines/{id}/status /mines/{id}/sectors/{sid}/status
//! - 告警：/alerts /alerts/{id}/acknowledge
//! - 站内消息：/messages/*
//! - 报表：/reports/*
//! - RBAC 管理面：/rbac/*
//! - 审计与指标：/audit /metrics

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

/// 创建 API 路由
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/livez", get(livez))
        .route("/readyz", get(readyz))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/get-async-routes", get(get_async_routes))
        .route("/metrics", get(get_metrics))
        .route("/overview", get(mines_overview))
        .route("/mines", get(list_mines).post(create_mine))
        .route(
            "/mines/:mine_id",
            get(get_mine).put(update_mine).delete(delete_mine),
        )
        .route("/mines/:mine_id/status", get(mine_status))
        .route(
            "/mines/:mine_id/sectors",
            get(list_sectors).post(create_sector),
        )
        .route(
            "/mines/:mine_id/sectors/:sector_id",
            get(get_sector).put(update_sector).delete(delete_sector),
        )
        .route(
            "/mines/:mine_id/sectors/:sector_id/status",
            get(sector_status),
        )
        .route(
            "/mines/:mine_id/sectors/:sector_id/sensors",
            get(list_sensors).post(create_sensor),
        )
        .route(
            "/mines/:mine_id/sectors/:sector_id/sensors/:sensor_id",
            get(get_sensor).put(update_sensor).delete(delete_sensor),
        )
        .route("/alerts", get(list_alerts))
        .route("/alerts/:alert_id/acknowledge", post(acknowledge_alert))
        .route("/messages", get(list_messages).post(send_message))
        .route("/messages/unread-count", get(unread_count))
        .route("/messages/:message_id/read", post(mark_message_read))
        .route("/reports/summary", get(global_report_summary))
        .route("/reports/predictive", get(predictive_report))
        .route("/mines/:mine_id/reports/summary", get(mine_report_summary))
        .route(
            "/mines/:mine_id/sectors/:sector_id/reports/summary",
            get(sector_report_summary),
        )
        .route("/rbac/users", get(list_rbac_users).post(create_rbac_user))
        .route(
            "/rbac/users/:user_id",
            axum::routing::put(update_rbac_user).delete(delete_rbac_user),
        )
        .route("/rbac/users/:user_id/role", post(set_rbac_user_role))
        .route(
            "/rbac/users/:user_id/sector-access",
            get(list_sector_access).post(grant_sector_access),
        )
        .route(
            "/rbac/users/:user_id/sector-access/:mine_id/:sector_id",
            axum::routing::delete(revoke_sector_access),
        )
        .route("/rbac/roles", get(list_rbac_roles).post(create_rbac_role))
        .route(
            "/rbac/roles/:role_code",
            axum::routing::delete(delete_rbac_role),
        )
        .route(
            "/rbac/roles/:role_code/permissions",
            post(set_rbac_role_permissions),
        )
        .route("/rbac/permissions", get(list_rbac_permissions))
        .route("/audit", get(list_audit_logs))
}
