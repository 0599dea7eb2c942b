//! 用户与 RBAC 内存存储实现
//!
//! 仅用于本地演示和测试。
//!
//! 功能：
//! - 内置 admin 账户（邮箱：admin@minemon.local，口令：admin123）
//! - 认证面查询（UserStore）与管理面操作（RbacStore）
//! - 角色权限整体替换：写锁内整体换掉 Vec，读者只会看到旧集或新集

use crate::error::StorageError;
use crate::models::{
    PermissionRecord, RbacUserCreate, RbacUserRecord, RbacUserUpdate, RoleCreate, RoleRecord,
    SectorAccessRecord, UserRecord,
};
use crate::traits::{RbacStore, UserStore};
use crate::validation::ensure_actor;
use domain::{AuthContext, permissions};
use std::collections::HashMap;
use std::sync::RwLock;

/// 用户与 RBAC 内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
    refresh_jtis: RwLock<HashMap<String, String>>,
    roles: RwLock<HashMap<String, RoleRecord>>,
    sector_access: RwLock<Vec<SectorAccessRecord>>,
}

impl InMemoryUserStore {
    /// 空存储。
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            refresh_jtis: RwLock::new(HashMap::new()),
            roles: RwLock::new(HashMap::new()),
            sector_access: RwLock::new(Vec::new()),
        }
    }

    /// 内置 admin 角色与账户
    ///
    /// admin 角色持有全部全局权限；口令为演示用明文，
    /// 首次登录校验通过后由认证层升级为 argon2 哈希。
    pub fn with_default_admin() -> Self {
        let store = Self::new();
        {
            let mut roles = store.roles.write().expect("roles lock");
            roles.insert(
                permissions::ROLE_ADMIN.to_string(),
                RoleRecord {
                    role_code: permissions::ROLE_ADMIN.to_string(),
                    name: "Administrator".to_string(),
                    permissions: permissions::GLOBAL_PERMISSION_CODES
                        .iter()
                        .map(|code| (*code).to_string())
                        .collect(),
                },
            );
        }
        {
            let mut users = store.users.write().expect("users lock");
            users.insert(
                "user-1".to_string(),
                UserRecord {
                    user_id: "user-1".to_string(),
                    username: "admin".to_string(),
                    email: "admin@minemon.local".to_string(),
                    password: "admin123".to_string(),
                    status: "active".to_string(),
                    role_code: Some(permissions::ROLE_ADMIN.to_string()),
                },
            );
        }
        store
    }

    fn user_to_rbac(record: &UserRecord) -> RbacUserRecord {
        RbacUserRecord {
            user_id: record.user_id.clone(),
            username: record.username.clone(),
            email: record.email.clone(),
            status: record.status.clone(),
            role_code: record.role_code.clone(),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(
        &self,
        _ctx: &AuthContext,
        email: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        Ok(self
            .users
            .read()
            .ok()
            .and_then(|map| map.values().find(|user| user.email == email).cloned()))
    }

    async fn find_user(
        &self,
        _ctx: &AuthContext,
        user_id: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        Ok(self
            .users
            .read()
            .ok()
            .and_then(|map| map.get(user_id).cloned()))
    }

    async fn update_password_hash(
        &self,
        _ctx: &AuthContext,
        user_id: &str,
        password_hash: &str,
    ) -> Result<bool, StorageError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match users.get_mut(user_id) {
            Some(user) => {
                user.password = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_refresh_jti(
        &self,
        _ctx: &AuthContext,
        user_id: &str,
    ) -> Result<Option<String>, StorageError> {
        Ok(self
            .refresh_jtis
            .read()
            .ok()
            .and_then(|map| map.get(user_id).cloned()))
    }

    async fn set_refresh_jti(
        &self,
        _ctx: &AuthContext,
        user_id: &str,
        refresh_jti: Option<&str>,
    ) -> Result<bool, StorageError> {
        let exists = self
            .users
            .read()
            .map(|map| map.contains_key(user_id))
            .unwrap_or(false);
        if !exists {
            return Ok(false);
        }
        let mut jtis = self
            .refresh_jtis
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match refresh_jti {
            Some(jti) => {
                jtis.insert(user_id.to_string(), jti.to_string());
            }
            None => {
                jtis.remove(user_id);
            }
        }
        Ok(true)
    }

    async fn count_role_holders(
        &self,
        _ctx: &AuthContext,
        role_code: &str,
    ) -> Result<i64, StorageError> {
        let count = self
            .users
            .read()
            .map(|map| {
                map.values()
                    .filter(|user| user.role_code.as_deref() == Some(role_code))
                    .count() as i64
            })
            .unwrap_or(0);
        Ok(count)
    }
}

#[async_trait::async_trait]
impl RbacStore for InMemoryUserStore {
    async fn list_users(&self, _ctx: &AuthContext) -> Result<Vec<RbacUserRecord>, StorageError> {
        let mut users: Vec<RbacUserRecord> = self
            .users
            .read()
            .map(|map| map.values().map(Self::user_to_rbac).collect())
            .unwrap_or_default();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn create_user(
        &self,
        ctx: &AuthContext,
        record: RbacUserCreate,
    ) -> Result<RbacUserRecord, StorageError> {
        ensure_actor(ctx)?;
        let mut users = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if users.values().any(|user| user.email == record.email) {
            return Err(StorageError::new("email already used"));
        }
        let user = UserRecord {
            user_id: record.user_id.clone(),
            username: record.username,
            email: record.email,
            password: record.password,
            status: record.status,
            role_code: record.role_code,
        };
        let rbac = Self::user_to_rbac(&user);
        users.insert(record.user_id, user);
        Ok(rbac)
    }

    async fn update_user(
        &self,
        ctx: &AuthContext,
        user_id: &str,
        update: RbacUserUpdate,
    ) -> Result<Option<RbacUserRecord>, StorageError> {
        ensure_actor(ctx)?;
        let mut users = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(None);
        };
        if let Some(password) = update.password {
            user.password = password;
            // 口令变更后作废已绑定的 refresh token
            if let Ok(mut jtis) = self.refresh_jtis.write() {
                jtis.remove(user_id);
            }
        }
        if let Some(status) = update.status {
            user.status = status;
        }
        Ok(Some(Self::user_to_rbac(user)))
    }

    async fn delete_user(&self, ctx: &AuthContext, user_id: &str) -> Result<bool, StorageError> {
        ensure_actor(ctx)?;
        let mut users = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let removed = users.remove(user_id).is_some();
        if removed {
            if let Ok(mut jtis) = self.refresh_jtis.write() {
                jtis.remove(user_id);
            }
            if let Ok(mut access) = self.sector_access.write() {
                access.retain(|entry| entry.user_id != user_id);
            }
        }
        Ok(removed)
    }

    async fn set_user_role(
        &self,
        ctx: &AuthContext,
        user_id: &str,
        role_code: Option<String>,
    ) -> Result<Option<RbacUserRecord>, StorageError> {
        ensure_actor(ctx)?;
        let mut users = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(None);
        };
        user.role_code = role_code;
        Ok(Some(Self::user_to_rbac(user)))
    }

    async fn list_roles(&self, _ctx: &AuthContext) -> Result<Vec<RoleRecord>, StorageError> {
        let mut roles: Vec<RoleRecord> = self
            .roles
            .read()
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default();
        roles.sort_by(|a, b| a.role_code.cmp(&b.role_code));
        Ok(roles)
    }

    async fn find_role(
        &self,
        _ctx: &AuthContext,
        role_code: &str,
    ) -> Result<Option<RoleRecord>, StorageError> {
        Ok(self
            .roles
            .read()
            .ok()
            .and_then(|map| map.get(role_code).cloned()))
    }

    async fn create_role(
        &self,
        ctx: &AuthContext,
        record: RoleCreate,
    ) -> Result<RoleRecord, StorageError> {
        ensure_actor(ctx)?;
        let mut roles = self
            .roles
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if roles.contains_key(&record.role_code) {
            return Err(StorageError::new("role already exists"));
        }
        let role = RoleRecord {
            role_code: record.role_code.clone(),
            name: record.name,
            permissions: record.permissions,
        };
        roles.insert(record.role_code, role.clone());
        Ok(role)
    }

    async fn delete_role(&self, ctx: &AuthContext, role_code: &str) -> Result<bool, StorageError> {
        ensure_actor(ctx)?;
        let mut roles = self
            .roles
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let removed = roles.remove(role_code).is_some();
        if removed {
            // 持有该角色的用户回落为无角色（权限读取时自然得到空集）
            if let Ok(mut users) = self.users.write() {
                for user in users.values_mut() {
                    if user.role_code.as_deref() == Some(role_code) {
                        user.role_code = None;
                    }
                }
            }
        }
        Ok(removed)
    }

    async fn set_role_permissions(
        &self,
        ctx: &AuthContext,
        role_code: &str,
        permissions: Vec<String>,
    ) -> Result<Option<RoleRecord>, StorageError> {
        ensure_actor(ctx)?;
        let mut roles = self
            .roles
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(role) = roles.get_mut(role_code) else {
            return Ok(None);
        };
        // 整体替换：读者拿到的是克隆出的旧集或新集，不存在部分并集
        role.permissions = permissions;
        Ok(Some(role.clone()))
    }

    async fn list_permissions(
        &self,
        _ctx: &AuthContext,
    ) -> Result<Vec<PermissionRecord>, StorageError> {
        let mut records: Vec<PermissionRecord> = permissions::GLOBAL_PERMISSION_CODES
            .iter()
            .chain(permissions::SECTOR_PERMISSION_CODES.iter())
            .map(|code| PermissionRecord {
                permission_code: (*code).to_string(),
                description: permissions::describe(code).to_string(),
            })
            .collect();
        records.sort_by(|a, b| a.permission_code.cmp(&b.permission_code));
        Ok(records)
    }

    async fn list_sector_access(
        &self,
        _ctx: &AuthContext,
        user_id: &str,
    ) -> Result<Vec<SectorAccessRecord>, StorageError> {
        Ok(self
            .sector_access
            .read()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.user_id == user_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn grant_sector_access(
        &self,
        ctx: &AuthContext,
        record: SectorAccessRecord,
    ) -> Result<SectorAccessRecord, StorageError> {
        ensure_actor(ctx)?;
        let mut entries = self
            .sector_access
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        // (user, mine, sector) 唯一：重复授予即整体替换
        entries.retain(|entry| {
            !(entry.user_id == record.user_id
                && entry.mine_id == record.mine_id
                && entry.sector_id == record.sector_id)
        });
        entries.push(record.clone());
        Ok(record)
    }

    async fn revoke_sector_access(
        &self,
        ctx: &AuthContext,
        user_id: &str,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<bool, StorageError> {
        ensure_actor(ctx)?;
        let mut entries = self
            .sector_access
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let before = entries.len();
        entries.retain(|entry| {
            !(entry.user_id == user_id
                && entry.mine_id == mine_id
                && entry.sector_id == sector_id)
        });
        Ok(entries.len() < before)
    }
}
