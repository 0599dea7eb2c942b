//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

// ============================================================================
// 认证
// ============================================================================

/// 登录请求体（以邮箱为登录标识）。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 登录响应体。
///
/// roles/permissions 在登录时由角色 + 分区覆盖现场推导，仅供前端渲染；
/// 后端授权判定从不信任该副本。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires: u64,
    pub username: String,
    pub nickname: String,
    pub avatar: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

/// 刷新 token 请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[serde(alias = "refresh_token")]
    pub refresh_token: String,
}

/// 刷新 token 响应体。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires: u64,
}

/// 动态路由返回结构（兼容 pure-admin-thin）。
#[derive(Debug, Serialize)]
pub struct AsyncRoute {
    pub path: String,
    pub name: String,
    pub component: String,
    pub meta: RouteMeta,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AsyncRoute>,
}

/// 路由元数据。
#[derive(Debug, Serialize)]
pub struct RouteMeta {
    pub title: String,
    pub icon: String,
    pub rank: i32,
    pub roles: Option<Vec<String>>,
    pub auths: Option<Vec<String>>,
}

// ============================================================================
// 矿井 / 分区 / 传感器
// ============================================================================

/// 矿井创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMineRequest {
    pub name: String,
    pub location: String,
    pub status: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub depth_m: f64,
}

/// 矿井更新请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMineRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub depth_m: Option<f64>,
}

/// 矿井返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MineDto {
    pub mine_id: String,
    pub name: String,
    pub location: String,
    pub status: String,
    pub latitude: f64,
    pub longitude: f64,
    pub depth_m: f64,
}

/// 分区创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectorRequest {
    pub name: String,
    pub level: i32,
    pub status: Option<String>,
}

/// 分区更新请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSectorRequest {
    pub name: Option<String>,
    pub level: Option<i32>,
    pub status: Option<String>,
}

/// 分区返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorDto {
    pub sector_id: String,
    pub mine_id: String,
    pub name: String,
    pub level: i32,
    pub status: String,
}

/// 传感器创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSensorRequest {
    pub sensor_type: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: Option<String>,
    pub calibration_scale: Option<f64>,
    pub calibration_offset: Option<f64>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub range_min: Option<f64>,
    pub range_max: Option<f64>,
}

/// 传感器更新请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSensorRequest {
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<String>,
    pub calibration_scale: Option<f64>,
    pub calibration_offset: Option<f64>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub range_min: Option<f64>,
    pub range_max: Option<f64>,
}

/// 传感器返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorDto {
    pub sensor_id: String,
    pub mine_id: String,
    pub sector_id: String,
    pub sensor_type: String,
    pub unit: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: String,
    pub calibration_scale: f64,
    pub calibration_offset: f64,
    pub calibrated_at_ms: Option<i64>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub range_min: Option<f64>,
    pub range_max: Option<f64>,
}

// ============================================================================
// RBAC 管理面
// ============================================================================

/// RBAC 用户创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRbacUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub status: Option<String>,
    pub role: Option<String>,
}

/// RBAC 用户更新请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRbacUserRequest {
    pub password: Option<String>,
    pub status: Option<String>,
}

/// 用户角色设置请求体（role 为空表示撤销角色）。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUserRoleRequest {
    pub role: Option<String>,
}

/// RBAC 用户返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RbacUserDto {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub status: String,
    pub role: Option<String>,
}

/// RBAC 角色创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRbacRoleRequest {
    pub role_code: String,
    pub name: String,
    pub permissions: Option<Vec<String>>,
}

/// 角色权限设置请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRolePermissionsRequest {
    pub permissions: Vec<String>,
}

/// RBAC 角色返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RbacRoleDto {
    pub role_code: String,
    pub name: String,
    pub permissions: Vec<String>,
}

/// 权限目录返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDto {
    pub permission_code: String,
    pub description: String,
}

/// 分区访问授予请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantSectorAccessRequest {
    pub mine_id: String,
    pub sector_id: String,
    pub permissions: Vec<String>,
}

/// 分区访问返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorAccessDto {
    pub mine_id: String,
    pub sector_id: String,
    pub permissions: Vec<String>,
}

// ============================================================================
// 告警
// ============================================================================

/// 告警查询参数。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsQuery {
    pub mine_id: Option<String>,
    pub sector_id: Option<String>,
    pub severity: Option<String>,
    pub acknowledged: Option<bool>,
    pub limit: Option<i64>,
}

/// 告警返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDto {
    pub alert_id: String,
    pub severity: String,
    pub message: String,
    pub location: String,
    pub mine_id: String,
    pub sector_id: Option<String>,
    pub sensor_id: Option<String>,
    pub raised_at_ms: i64,
    pub acknowledged: bool,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at_ms: Option<i64>,
}

// ============================================================================
// 实时状态 / 仪表盘
// ============================================================================

/// 传感器实时状态。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorStatusDto {
    pub sensor_id: String,
    pub sensor_type: String,
    pub unit: String,
    pub location: String,
    pub value: Option<f64>,
    pub ts_ms: Option<i64>,
    pub tier: String,
}

/// 分区实时状态（分层取分区内传感器最差值）。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorStatusDto {
    pub sector_id: String,
    pub name: String,
    pub level: i32,
    pub tier: String,
    pub sensors: Vec<SensorStatusDto>,
}

/// 矿井实时状态（分层取所有分区最差值）。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MineStatusDto {
    pub mine_id: String,
    pub name: String,
    pub status: String,
    pub tier: String,
    pub sectors: Vec<SectorStatusDto>,
}

/// 矿井总览条目（仪表盘列表与地图着色用）。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MineOverviewDto {
    pub mine_id: String,
    pub name: String,
    pub status: String,
    pub tier: String,
    pub latitude: f64,
    pub longitude: f64,
    pub open_alerts: i64,
}

// ============================================================================
// 消息
// ============================================================================

/// 站内消息发送请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub recipient_id: String,
    pub subject: String,
    pub body: String,
}

/// 站内消息返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub message_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub recipient_id: String,
    pub subject: String,
    pub body: String,
    pub sent_at_ms: i64,
    pub read: bool,
}

/// 收件箱查询参数。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
}

// ============================================================================
// 报表 / 审计 / 指标
// ============================================================================

/// 报表摘要返回结构（mine_id 为空表示全局汇总）。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummaryDto {
    pub mine_id: Option<String>,
    pub mines: i64,
    pub sectors: i64,
    pub sensors: i64,
    pub sensors_normal: i64,
    pub sensors_warning: i64,
    pub sensors_critical: i64,
    pub open_alerts: i64,
    pub acknowledged_alerts: i64,
}

/// 审计日志查询参数。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub limit: Option<i64>,
}

/// 审计日志返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogDto {
    pub audit_id: String,
    pub user_id: String,
    pub action: String,
    pub detail: String,
    pub ts_ms: i64,
}

/// Telemetry 指标快照返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub readings_received: u64,
    pub readings_dropped_invalid: u64,
    pub readings_dropped_unmapped: u64,
    pub readings_dropped_inactive: u64,
    pub readings_evaluated: u64,
    pub realtime_write_success: u64,
    pub realtime_write_failure: u64,
    pub alerts_raised: u64,
    pub alerts_suppressed_debounce: u64,
    pub alerts_deduplicated: u64,
    pub alerts_acknowledged: u64,
    pub authz_checks: u64,
    pub authz_denied: u64,
    pub last_admin_blocks: u64,
    pub messages_sent: u64,
    pub evaluate_latency_ms_total: u64,
    pub evaluate_latency_ms_count: u64,
    pub end_to_end_latency_ms_total: u64,
    pub end_to_end_latency_ms_count: u64,
}
