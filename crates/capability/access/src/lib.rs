//! 授权能力：角色权限 + 分区覆盖的有效权限推导与授权闸门。
//!
//! 两条判定路径：
//! - 全局作用域：有效权限 = 用户角色的全局权限集
//! - 分区作用域：有效权限 = 角色全局权限隐含的分区权限
//!   ∪ 该 (矿井, 分区) 的 SectorAccess 覆盖集
//!
//! 原则：
//! - 默认拒绝：未命中权限一律返回 false，授权失败不抛错
//! - 权限永远在读取时推导，任何地方不信任用户对象上的权限副本
//! - 结构性保护独立于权限：最后一名 admin 不可删除/降级/停用

use domain::permissions::{self, Scope};
use domain::AuthContext;
use minemon_storage::{RbacStore, RoleRecord, SectorAccessRecord, UserStore};
use std::collections::HashSet;
use std::sync::Arc;

/// 授权相关错误。
///
/// 注意：普通授权失败不是错误（authorize 返回 Ok(false)）；
/// 这里只承载结构性拒绝与底层故障。
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("last admin is protected")]
    LastAdminProtected,
    #[error("unknown permission: {0}")]
    UnknownPermission(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<minemon_storage::StorageError> for AccessError {
    fn from(err: minemon_storage::StorageError) -> Self {
        AccessError::Storage(err.to_string())
    }
}

/// 授权闸门与权限模型的唯一入口。
pub struct AccessControl {
    users: Arc<dyn UserStore>,
    rbac: Arc<dyn RbacStore>,
}

impl AccessControl {
    pub fn new(users: Arc<dyn UserStore>, rbac: Arc<dyn RbacStore>) -> Self {
        Self { users, rbac }
    }

    /// 推导用户在给定作用域下的有效权限集。
    ///
    /// 用户不存在、无角色、角色已被删除都得到良定义的空集，从不报错。
    pub async fn effective_permissions(
        &self,
        ctx: &AuthContext,
        user_id: &str,
        scope: &Scope,
    ) -> Result<HashSet<String>, AccessError> {
        let Some(user) = self.users.find_user(ctx, user_id).await? else {
            return Ok(HashSet::new());
        };

        let role = match user.role_code.as_deref() {
            Some(role_code) => self.rbac.find_role(ctx, role_code).await?,
            None => None,
        };

        match scope {
            Scope::Global => Ok(role
                .map(|role| role.permissions.into_iter().collect())
                .unwrap_or_default()),
            Scope::Sector { mine_id, sector_id } => {
                let mut effective: HashSet<String> = HashSet::new();
                if let Some(role) = &role {
                    for global_code in &role.permissions {
                        for implied in permissions::implied_sector_permissions(global_code) {
                            effective.insert((*implied).to_string());
                        }
                    }
                }
                let overrides = self.rbac.list_sector_access(ctx, user_id).await?;
                if let Some(entry) = overrides
                    .iter()
                    .find(|entry| entry.mine_id == *mine_id && entry.sector_id == *sector_id)
                {
                    effective.extend(entry.permissions.iter().cloned());
                }
                Ok(effective)
            }
        }
    }

    /// 授权判定：用户 user_id 能否在 scope 下执行 permission。
    ///
    /// 默认拒绝；权限码不属于作用域对应的命名空间时同样拒绝。
    pub async fn authorize(
        &self,
        ctx: &AuthContext,
        user_id: &str,
        permission: &str,
        scope: &Scope,
    ) -> Result<bool, AccessError> {
        let namespace_ok = match scope {
            Scope::Global => permissions::is_global_permission(permission),
            Scope::Sector { .. } => permissions::is_sector_permission(permission),
        };
        if !namespace_ok {
            return Ok(false);
        }

        // 停用账号的既有 token 不再授予任何权限
        match self.users.find_user(ctx, user_id).await? {
            Some(user) if user.status == "active" => {}
            _ => return Ok(false),
        }

        let effective = self.effective_permissions(ctx, user_id, scope).await?;
        Ok(effective.contains(permission))
    }

    /// 结构性保护：目标用户是最后一名 admin 时拒绝删除/降级/停用。
    ///
    /// 与权限判定无关——无论操作者自身权限如何都会被拒绝。
    pub async fn ensure_not_last_admin(
        &self,
        ctx: &AuthContext,
        target_user_id: &str,
    ) -> Result<(), AccessError> {
        let Some(target) = self.users.find_user(ctx, target_user_id).await? else {
            return Ok(());
        };
        if target.role_code.as_deref() != Some(permissions::ROLE_ADMIN) {
            return Ok(());
        }
        let holders = self
            .users
            .count_role_holders(ctx, permissions::ROLE_ADMIN)
            .await?;
        if holders <= 1 {
            return Err(AccessError::LastAdminProtected);
        }
        Ok(())
    }

    /// 原子替换角色权限集；所有权限码必须属于全局命名空间。
    ///
    /// 生效对持有该角色的所有用户即时可见（权限在读取时推导）。
    pub async fn update_role_permissions(
        &self,
        ctx: &AuthContext,
        role_code: &str,
        codes: Vec<String>,
    ) -> Result<Option<RoleRecord>, AccessError> {
        for code in &codes {
            if !permissions::is_global_permission(code) {
                return Err(AccessError::UnknownPermission(code.clone()));
            }
        }
        Ok(self.rbac.set_role_permissions(ctx, role_code, codes).await?)
    }

    /// 授予分区访问覆盖；所有权限码必须属于分区命名空间。
    pub async fn grant_sector_access(
        &self,
        ctx: &AuthContext,
        record: SectorAccessRecord,
    ) -> Result<SectorAccessRecord, AccessError> {
        for code in &record.permissions {
            if !permissions::is_sector_permission(code) {
                return Err(AccessError::UnknownPermission(code.clone()));
            }
        }
        Ok(self.rbac.grant_sector_access(ctx, record).await?)
    }
}
