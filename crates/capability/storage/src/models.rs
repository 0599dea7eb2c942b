//! 数据模型
//!
//! 定义所有存储相关的数据模型和更新结构：
//! - 用户模型：UserRecord（认证用，含口令哈希）
//! - RBAC 模型：RbacUserRecord/Create/Update, RoleRecord, SectorAccessRecord
//! - 资产层级：MineRecord → SectorRecord → SensorRecord
//! - 告警模型：AlertRecord（软生命周期，只追加 + 确认）
//! - 消息模型：MessageRecord（站内收件箱）
//! - 实时模型：SensorReadingRecord（最新标定读数 + 状态分层）
//! - 审计模型：AuditLogRecord

use domain::AuthContext;

/// 用户记录（认证面：含口令哈希与角色引用）。
///
/// 只持有 role_code 引用，权限永远在读取时从角色 + 分区覆盖推导。
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub status: String,
    pub role_code: Option<String>,
}

impl UserRecord {
    /// 将用户记录转换为执行上下文。
    pub fn to_auth_context(&self) -> AuthContext {
        AuthContext::new(self.user_id.clone(), self.username.clone(), None)
    }
}

/// RBAC 用户（管理面用，避免返回口令字段）。
#[derive(Debug, Clone)]
pub struct RbacUserRecord {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub status: String,
    pub role_code: Option<String>,
}

/// RBAC 用户创建输入（管理面用）。
#[derive(Debug, Clone)]
pub struct RbacUserCreate {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub status: String,
    pub role_code: Option<String>,
}

/// RBAC 用户更新输入（管理面用）。
#[derive(Debug, Clone)]
pub struct RbacUserUpdate {
    pub password: Option<String>,
    pub status: Option<String>,
}

/// 角色记录：全局权限集的唯一宿主。
#[derive(Debug, Clone)]
pub struct RoleRecord {
    pub role_code: String,
    pub name: String,
    pub permissions: Vec<String>,
}

/// 角色创建输入。
#[derive(Debug, Clone)]
pub struct RoleCreate {
    pub role_code: String,
    pub name: String,
    pub permissions: Vec<String>,
}

/// 权限目录条目。
#[derive(Debug, Clone)]
pub struct PermissionRecord {
    pub permission_code: String,
    pub description: String,
}

/// 分区访问覆盖：(user, mine, sector) 唯一。
#[derive(Debug, Clone)]
pub struct SectorAccessRecord {
    pub user_id: String,
    pub mine_id: String,
    pub sector_id: String,
    pub permissions: Vec<String>,
}

/// 矿井记录。
#[derive(Debug, Clone)]
pub struct MineRecord {
    pub mine_id: String,
    pub name: String,
    pub location: String,
    pub status: String,
    pub latitude: f64,
    pub longitude: f64,
    pub depth_m: f64,
}

/// 矿井更新输入。
#[derive(Debug, Clone)]
pub struct MineUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub depth_m: Option<f64>,
}

/// 分区记录：level 在矿井内唯一。
#[derive(Debug, Clone)]
pub struct SectorRecord {
    pub sector_id: String,
    pub mine_id: String,
    pub name: String,
    pub level: i32,
    pub status: String,
}

/// 分区更新输入。
#[derive(Debug, Clone)]
pub struct SectorUpdate {
    pub name: Option<String>,
    pub level: Option<i32>,
    pub status: Option<String>,
}

/// 传感器记录（含标定元数据与厂商规格）。
#[derive(Debug, Clone)]
pub struct SensorRecord {
    pub sensor_id: String,
    pub mine_id: String,
    pub sector_id: String,
    pub sensor_type: String,
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

/// 传感器更新输入。
#[derive(Debug, Clone)]
pub struct SensorUpdate {
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<String>,
    pub calibration_scale: Option<f64>,
    pub calibration_offset: Option<f64>,
    pub calibrated_at_ms: Option<i64>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub range_min: Option<f64>,
    pub range_max: Option<f64>,
}

/// 告警记录。
///
/// entity_key 是受监测实体的稳定键（domain::MonitoredEntity::key）。
/// (entity_key, severity, debounce_slot) 组成未确认告警的唯一约束键：
/// debounce_slot 由告警生成器按去抖窗口分桶计算，使窗口外允许出现
/// 新的未确认告警，窗口内的并发竞态则由唯一约束兜底。
#[derive(Debug, Clone)]
pub struct AlertRecord {
    pub alert_id: String,
    pub entity_key: String,
    pub severity: String,
    pub debounce_slot: i64,
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

/// 告警查询过滤条件。
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub mine_id: Option<String>,
    pub sector_id: Option<String>,
    pub severity: Option<String>,
    pub acknowledged: Option<bool>,
    pub limit: i64,
}

/// 站内消息记录。
#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub message_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub recipient_id: String,
    pub subject: String,
    pub body: String,
    pub sent_at_ms: i64,
    pub read: bool,
}

/// 传感器最新读数与分层（实时存储条目）。
#[derive(Debug, Clone)]
pub struct SensorReadingRecord {
    pub mine_id: String,
    pub sector_id: String,
    pub sensor_id: String,
    pub sensor_type: String,
    pub value: f64,
    pub tier: String,
    pub ts_ms: i64,
}

/// 审计日志记录。
#[derive(Debug, Clone)]
pub struct AuditLogRecord {
    pub audit_id: String,
    pub user_id: String,
    pub action: String,
    pub detail: String,
    pub ts_ms: i64,
}
