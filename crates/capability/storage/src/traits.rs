//! 存储接口 Trait 定义
//!
//! 定义所有资源存储的异步接口：
//! - UserStore：认证面用户查询
//! - RbacStore：用户/角色/权限/分区访问管理面
//! - MineStore / SectorStore / SensorStore：资产层级
//! - AlertStore：告警（只追加 + 确认）
//! - MessageStore：站内消息
//! - RealtimeStore：传感器最新读数与分层
//! - AuditLogStore：审计日志
//!
//! 设计原则：
//! - 所有接口显式接收 AuthContext
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::models::{
    AlertFilter, AlertRecord, AuditLogRecord, MessageRecord, MineRecord, MineUpdate,
    PermissionRecord, RbacUserCreate, RbacUserRecord, RbacUserUpdate, RoleCreate, RoleRecord,
    SectorAccessRecord, SectorRecord, SectorUpdate, SensorReadingRecord, SensorRecord,
    SensorUpdate, UserRecord,
};
use async_trait::async_trait;
use domain::AuthContext;

/// 认证面用户存储接口
///
/// 登录、刷新与最后管理员保护计数使用（禁止在 handler 中直接连 SQL）。
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 根据邮箱查找用户（登录标识）
    async fn find_by_email(
        &self,
        ctx: &AuthContext,
        email: &str,
    ) -> Result<Option<UserRecord>, StorageError>;

    /// 根据用户 ID 查找用户
    async fn find_user(
        &self,
        ctx: &AuthContext,
        user_id: &str,
    ) -> Result<Option<UserRecord>, StorageError>;

    /// 更新口令哈希
    async fn update_password_hash(
        &self,
        ctx: &AuthContext,
        user_id: &str,
        password_hash: &str,
    ) -> Result<bool, StorageError>;

    /// 读取当前绑定的 refresh token jti
    async fn get_refresh_jti(
        &self,
        ctx: &AuthContext,
        user_id: &str,
    ) -> Result<Option<String>, StorageError>;

    /// 绑定/清除 refresh token jti
    async fn set_refresh_jti(
        &self,
        ctx: &AuthContext,
        user_id: &str,
        refresh_jti: Option<&str>,
    ) -> Result<bool, StorageError>;

    /// 统计持有指定角色的用户数（最后管理员保护用）
    async fn count_role_holders(
        &self,
        ctx: &AuthContext,
        role_code: &str,
    ) -> Result<i64, StorageError>;
}

/// RBAC 管理面存储接口
///
/// 角色权限替换必须整体原子生效：读者看到旧集或新集，不允许半新半旧。
#[async_trait]
pub trait RbacStore: Send + Sync {
    /// 列出所有用户
    async fn list_users(&self, ctx: &AuthContext) -> Result<Vec<RbacUserRecord>, StorageError>;

    /// 创建用户
    async fn create_user(
        &self,
        ctx: &AuthContext,
        record: RbacUserCreate,
    ) -> Result<RbacUserRecord, StorageError>;

    /// 更新用户（口令/状态）
    async fn update_user(
        &self,
        ctx: &AuthContext,
        user_id: &str,
        update: RbacUserUpdate,
    ) -> Result<Option<RbacUserRecord>, StorageError>;

    /// 删除用户
    async fn delete_user(&self, ctx: &AuthContext, user_id: &str) -> Result<bool, StorageError>;

    /// 设置/撤销用户角色
    async fn set_user_role(
        &self,
        ctx: &AuthContext,
        user_id: &str,
        role_code: Option<String>,
    ) -> Result<Option<RbacUserRecord>, StorageError>;

    /// 列出所有角色
    async fn list_roles(&self, ctx: &AuthContext) -> Result<Vec<RoleRecord>, StorageError>;

    /// 查找角色
    async fn find_role(
        &self,
        ctx: &AuthContext,
        role_code: &str,
    ) -> Result<Option<RoleRecord>, StorageError>;

    /// 创建角色
    async fn create_role(
        &self,
        ctx: &AuthContext,
        record: RoleCreate,
    ) -> Result<RoleRecord, StorageError>;

    /// 删除角色
    async fn delete_role(&self, ctx: &AuthContext, role_code: &str) -> Result<bool, StorageError>;

    /// 原子替换角色权限集
    async fn set_role_permissions(
        &self,
        ctx: &AuthContext,
        role_code: &str,
        permissions: Vec<String>,
    ) -> Result<Option<RoleRecord>, StorageError>;

    /// 权限目录
    async fn list_permissions(
        &self,
        ctx: &AuthContext,
    ) -> Result<Vec<PermissionRecord>, StorageError>;

    /// 列出用户的分区访问覆盖
    async fn list_sector_access(
        &self,
        ctx: &AuthContext,
        user_id: &str,
    ) -> Result<Vec<SectorAccessRecord>, StorageError>;

    /// 授予/更新分区访问（(user, mine, sector) 唯一，重复授予为整体替换）
    async fn grant_sector_access(
        &self,
        ctx: &AuthContext,
        record: SectorAccessRecord,
    ) -> Result<SectorAccessRecord, StorageError>;

    /// 撤销分区访问
    async fn revoke_sector_access(
        &self,
        ctx: &AuthContext,
        user_id: &str,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<bool, StorageError>;
}

/// 矿井存储接口
#[async_trait]
pub trait MineStore: Send + Sync {
    /// 列出所有矿井
    async fn list_mines(&self, ctx: &AuthContext) -> Result<Vec<MineRecord>, StorageError>;

    /// 查找矿井
    async fn find_mine(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<Option<MineRecord>, StorageError>;

    /// 创建矿井
    async fn create_mine(
        &self,
        ctx: &AuthContext,
        record: MineRecord,
    ) -> Result<MineRecord, StorageError>;

    /// 更新矿井
    async fn update_mine(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        update: MineUpdate,
    ) -> Result<Option<MineRecord>, StorageError>;

    /// 删除矿井（级联删除由调用方按 分区 → 传感器 顺序执行）
    async fn delete_mine(&self, ctx: &AuthContext, mine_id: &str) -> Result<bool, StorageError>;

    /// 验证矿井存在
    async fn mine_exists(&self, ctx: &AuthContext, mine_id: &str) -> Result<bool, StorageError>;
}

/// 分区存储接口
///
/// create/update 在层级冲突时返回 StorageError::DuplicateSectorLevel。
#[async_trait]
pub trait SectorStore: Send + Sync {
    /// 列出矿井下所有分区
    async fn list_sectors(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<Vec<SectorRecord>, StorageError>;

    /// 查找分区
    async fn find_sector(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<Option<SectorRecord>, StorageError>;

    /// 创建分区
    async fn create_sector(
        &self,
        ctx: &AuthContext,
        record: SectorRecord,
    ) -> Result<SectorRecord, StorageError>;

    /// 更新分区
    async fn update_sector(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
        update: SectorUpdate,
    ) -> Result<Option<SectorRecord>, StorageError>;

    /// 删除分区
    async fn delete_sector(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<bool, StorageError>;

    /// 删除矿井下所有分区（矿井级联删除用）
    async fn delete_sectors_of_mine(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<i64, StorageError>;
}

/// 传感器存储接口
#[async_trait]
pub trait SensorStore: Send + Sync {
    /// 列出分区下所有传感器
    async fn list_sectors_sensors(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<Vec<SensorRecord>, StorageError>;

    /// 列出矿井下所有传感器
    async fn list_mine_sensors(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<Vec<SensorRecord>, StorageError>;

    /// 查找传感器
    async fn find_sensor(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
        sensor_id: &str,
    ) -> Result<Option<SensorRecord>, StorageError>;

    /// 创建传感器
    async fn create_sensor(
        &self,
        ctx: &AuthContext,
        record: SensorRecord,
    ) -> Result<SensorRecord, StorageError>;

    /// 更新传感器
    async fn update_sensor(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
        sensor_id: &str,
        update: SensorUpdate,
    ) -> Result<Option<SensorRecord>, StorageError>;

    /// 删除传感器
    async fn delete_sensor(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
        sensor_id: &str,
    ) -> Result<bool, StorageError>;

    /// 删除分区下所有传感器（分区删除级联用）
    async fn delete_sensors_of_sector(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<i64, StorageError>;

    /// 删除矿井下所有传感器（矿井删除级联用）
    async fn delete_sensors_of_mine(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<i64, StorageError>;
}

/// 告警存储接口
///
/// 告警只追加与确认，核心永不删除。
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// 插入新告警；同一 (entity_key, severity) 已有未确认告警时
    /// 返回 StorageError::DuplicateOpenAlert
    async fn insert_alert(
        &self,
        ctx: &AuthContext,
        record: AlertRecord,
    ) -> Result<AlertRecord, StorageError>;

    /// 按过滤条件列出告警（按时间倒序）
    async fn list_alerts(
        &self,
        ctx: &AuthContext,
        filter: AlertFilter,
    ) -> Result<Vec<AlertRecord>, StorageError>;

    /// 查找告警
    async fn find_alert(
        &self,
        ctx: &AuthContext,
        alert_id: &str,
    ) -> Result<Option<AlertRecord>, StorageError>;

    /// 确认告警（幂等：重复确认返回当前记录，不报错）
    async fn acknowledge_alert(
        &self,
        ctx: &AuthContext,
        alert_id: &str,
        acknowledged_by: &str,
        acknowledged_at_ms: i64,
    ) -> Result<Option<AlertRecord>, StorageError>;

    /// 查找指定实体/严重级在 since_ms 之后产生的未确认告警（去抖用）
    async fn find_recent_open(
        &self,
        ctx: &AuthContext,
        entity_key: &str,
        severity: &str,
        since_ms: i64,
    ) -> Result<Option<AlertRecord>, StorageError>;

    /// 统计未确认告警数（mine_id 为空统计全局）
    async fn count_open(
        &self,
        ctx: &AuthContext,
        mine_id: Option<&str>,
    ) -> Result<i64, StorageError>;

    /// 统计已确认告警数（mine_id 为空统计全局）
    async fn count_acknowledged(
        &self,
        ctx: &AuthContext,
        mine_id: Option<&str>,
    ) -> Result<i64, StorageError>;
}

/// 站内消息存储接口
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// 发送消息
    async fn send_message(
        &self,
        ctx: &AuthContext,
        record: MessageRecord,
    ) -> Result<MessageRecord, StorageError>;

    /// 列出收件箱（按时间倒序）
    async fn list_inbox(
        &self,
        ctx: &AuthContext,
        recipient_id: &str,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<MessageRecord>, StorageError>;

    /// 标记已读（幂等）
    async fn mark_read(
        &self,
        ctx: &AuthContext,
        recipient_id: &str,
        message_id: &str,
    ) -> Result<Option<MessageRecord>, StorageError>;

    /// 未读消息数
    async fn unread_count(
        &self,
        ctx: &AuthContext,
        recipient_id: &str,
    ) -> Result<i64, StorageError>;
}

/// 实时读数存储接口
///
/// 只保留每个传感器的最新标定读数与分层；历史读数不属于核心。
#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// 写入/覆盖传感器最新读数
    async fn upsert_reading(
        &self,
        ctx: &AuthContext,
        record: &SensorReadingRecord,
    ) -> Result<(), StorageError>;

    /// 读取传感器最新读数
    async fn get_reading(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
        sensor_id: &str,
    ) -> Result<Option<SensorReadingRecord>, StorageError>;

    /// 列出分区内全部最新读数
    async fn list_sector_readings(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<Vec<SensorReadingRecord>, StorageError>;

    /// 列出矿井内全部最新读数
    async fn list_mine_readings(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<Vec<SensorReadingRecord>, StorageError>;
}

/// 审计日志存储接口
#[async_trait]
pub trait AuditLogStore: Send + Sync {
    /// 追加审计记录
    async fn append_audit(
        &self,
        ctx: &AuthContext,
        record: AuditLogRecord,
    ) -> Result<(), StorageError>;

    /// 查询审计记录（按时间倒序）
    async fn list_audit_logs(
        &self,
        ctx: &AuthContext,
        from_ms: Option<i64>,
        to_ms: Option<i64>,
        limit: i64,
    ) -> Result<Vec<AuditLogRecord>, StorageError>;
}
