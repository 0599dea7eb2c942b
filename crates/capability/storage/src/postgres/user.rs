//! Postgres 用户与 RBAC 存储实现
//!
//! 设计要点：
//! - 角色权限落在 role_permissions 连接表，替换在单事务内 delete + insert，
//!   读者要么看到旧集要么看到新集
//! - 分区访问覆盖落在 sector_access 连接表，(user, mine, sector) 组合唯一
//! - 用户只持有 role_code 引用，永不落盘权限副本

use crate::error::StorageError;
use crate::models::{
    PermissionRecord, RbacUserCreate, RbacUserRecord, RbacUserUpdate, RoleCreate, RoleRecord,
    SectorAccessRecord, UserRecord,
};
use crate::traits::{RbacStore, UserStore};
use domain::AuthContext;
use sqlx::{PgPool, Row};
use std::collections::HashMap;

pub struct PgUserStore {
    pub pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 通过数据库 URL 建立连接池
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }

    fn user_row_to_record(row: &sqlx::postgres::PgRow) -> Result<UserRecord, StorageError> {
        Ok(UserRecord {
            user_id: row.try_get("user_id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password: row.try_get("password_hash")?,
            status: row.try_get("status")?,
            role_code: row.try_get("role_code")?,
        })
    }

    fn user_row_to_rbac(row: &sqlx::postgres::PgRow) -> Result<RbacUserRecord, StorageError> {
        Ok(RbacUserRecord {
            user_id: row.try_get("user_id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            status: row.try_get("status")?,
            role_code: row.try_get("role_code")?,
        })
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(
        &self,
        _ctx: &AuthContext,
        email: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query(
            "select user_id, username, email, password_hash, status, role_code \
             from users where email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(Self::user_row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_user(
        &self,
        _ctx: &AuthContext,
        user_id: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query(
            "select user_id, username, email, password_hash, status, role_code \
             from users where user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(Self::user_row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn update_password_hash(
        &self,
        _ctx: &AuthContext,
        user_id: &str,
        password_hash: &str,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query("update users set password_hash = $2 where user_id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_refresh_jti(
        &self,
        _ctx: &AuthContext,
        user_id: &str,
    ) -> Result<Option<String>, StorageError> {
        let value: Option<String> =
            sqlx::query_scalar("select refresh_jti from users where user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
                .flatten();
        Ok(value)
    }

    async fn set_refresh_jti(
        &self,
        _ctx: &AuthContext,
        user_id: &str,
        refresh_jti: Option<&str>,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query("update users set refresh_jti = $2 where user_id = $1")
            .bind(user_id)
            .bind(refresh_jti)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_role_holders(
        &self,
        _ctx: &AuthContext,
        role_code: &str,
    ) -> Result<i64, StorageError> {
        let count: i64 = sqlx::query_scalar("select count(*) from users where role_code = $1")
            .bind(role_code)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait::async_trait]
impl RbacStore for PgUserStore {
    async fn list_users(&self, _ctx: &AuthContext) -> Result<Vec<RbacUserRecord>, StorageError> {
        let rows = sqlx::query(
            "select user_id, username, email, status, role_code from users order by username asc",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            users.push(Self::user_row_to_rbac(&row)?);
        }
        Ok(users)
    }

    async fn create_user(
        &self,
        _ctx: &AuthContext,
        record: RbacUserCreate,
    ) -> Result<RbacUserRecord, StorageError> {
        sqlx::query(
            "insert into users (user_id, username, email, password_hash, status, role_code) \
             values ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&record.user_id)
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.password)
        .bind(&record.status)
        .bind(&record.role_code)
        .execute(&self.pool)
        .await?;
        Ok(RbacUserRecord {
            user_id: record.user_id,
            username: record.username,
            email: record.email,
            status: record.status,
            role_code: record.role_code,
        })
    }

    async fn update_user(
        &self,
        _ctx: &AuthContext,
        user_id: &str,
        update: RbacUserUpdate,
    ) -> Result<Option<RbacUserRecord>, StorageError> {
        let row = sqlx::query(
            "update users set password_hash = coalesce($2, password_hash), \
             status = coalesce($3, status), \
             refresh_jti = case when $2 is null then refresh_jti else null end \
             where user_id = $1 \
             returning user_id, username, email, status, role_code",
        )
        .bind(user_id)
        .bind(update.password)
        .bind(update.status)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(Self::user_row_to_rbac(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_user(&self, _ctx: &AuthContext, user_id: &str) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("delete from sector_access where user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("delete from users where user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_user_role(
        &self,
        _ctx: &AuthContext,
        user_id: &str,
        role_code: Option<String>,
    ) -> Result<Option<RbacUserRecord>, StorageError> {
        let row = sqlx::query(
            "update users set role_code = $2 where user_id = $1 \
             returning user_id, username, email, status, role_code",
        )
        .bind(user_id)
        .bind(role_code)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(Self::user_row_to_rbac(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_roles(&self, _ctx: &AuthContext) -> Result<Vec<RoleRecord>, StorageError> {
        let rows = sqlx::query("select role_code, name from roles order by role_code asc")
            .fetch_all(&self.pool)
            .await?;
        let mut roles: Vec<RoleRecord> = Vec::with_capacity(rows.len());
        let mut role_codes: Vec<String> = Vec::with_capacity(rows.len());
        for row in rows {
            let role_code: String = row.try_get("role_code")?;
            let name: String = row.try_get("name")?;
            role_codes.push(role_code.clone());
            roles.push(RoleRecord {
                role_code,
                name,
                permissions: Vec::new(),
            });
        }

        if role_codes.is_empty() {
            return Ok(roles);
        }

        let rows = sqlx::query(
            "select role_code, permission_code from role_permissions where role_code = any($1)",
        )
        .bind(&role_codes)
        .fetch_all(&self.pool)
        .await?;

        let mut perm_map: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            let role_code: String = row.try_get("role_code")?;
            let permission_code: String = row.try_get("permission_code")?;
            perm_map.entry(role_code).or_default().push(permission_code);
        }

        for role in &mut roles {
            if let Some(perms) = perm_map.get(&role.role_code) {
                let mut perms = perms.clone();
                perms.sort();
                role.permissions = perms;
            }
        }

        Ok(roles)
    }

    async fn find_role(
        &self,
        _ctx: &AuthContext,
        role_code: &str,
    ) -> Result<Option<RoleRecord>, StorageError> {
        let row = sqlx::query("select role_code, name from roles where role_code = $1")
            .bind(role_code)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let name: String = row.try_get("name")?;
        let mut permissions: Vec<String> = sqlx::query_scalar(
            "select permission_code from role_permissions where role_code = $1",
        )
        .bind(role_code)
        .fetch_all(&self.pool)
        .await?;
        permissions.sort();
        Ok(Some(RoleRecord {
            role_code: role_code.to_string(),
            name,
            permissions,
        }))
    }

    async fn create_role(
        &self,
        _ctx: &AuthContext,
        record: RoleCreate,
    ) -> Result<RoleRecord, StorageError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("insert into roles (role_code, name) values ($1, $2)")
            .bind(&record.role_code)
            .bind(&record.name)
            .execute(&mut *tx)
            .await?;
        for permission_code in &record.permissions {
            sqlx::query(
                "insert into role_permissions (role_code, permission_code) \
                 values ($1, $2) on conflict do nothing",
            )
            .bind(&record.role_code)
            .bind(permission_code)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(RoleRecord {
            role_code: record.role_code,
            name: record.name,
            permissions: record.permissions,
        })
    }

    async fn delete_role(&self, _ctx: &AuthContext, role_code: &str) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("update users set role_code = null where role_code = $1")
            .bind(role_code)
            .execute(&mut *tx)
            .await?;
        sqlx::query("delete from role_permissions where role_code = $1")
            .bind(role_code)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("delete from roles where role_code = $1")
            .bind(role_code)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_role_permissions(
        &self,
        _ctx: &AuthContext,
        role_code: &str,
        permissions: Vec<String>,
    ) -> Result<Option<RoleRecord>, StorageError> {
        let row = sqlx::query("select role_code, name from roles where role_code = $1")
            .bind(role_code)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let name: String = row.try_get("name")?;

        // 单事务内整体替换：并发读者只会看到旧集或新集
        let mut tx = self.pool.begin().await?;
        sqlx::query("delete from role_permissions where role_code = $1")
            .bind(role_code)
            .execute(&mut *tx)
            .await?;
        for permission_code in &permissions {
            sqlx::query(
                "insert into role_permissions (role_code, permission_code) \
                 values ($1, $2) on conflict do nothing",
            )
            .bind(role_code)
            .bind(permission_code)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(Some(RoleRecord {
            role_code: role_code.to_string(),
            name,
            permissions,
        }))
    }

    async fn list_permissions(
        &self,
        _ctx: &AuthContext,
    ) -> Result<Vec<PermissionRecord>, StorageError> {
        let rows = sqlx::query(
            "select permission_code, description from permissions order by permission_code asc",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut permissions = Vec::with_capacity(rows.len());
        for row in rows {
            permissions.push(PermissionRecord {
                permission_code: row.try_get("permission_code")?,
                description: row.try_get("description")?,
            });
        }
        Ok(permissions)
    }

    async fn list_sector_access(
        &self,
        _ctx: &AuthContext,
        user_id: &str,
    ) -> Result<Vec<SectorAccessRecord>, StorageError> {
        let rows = sqlx::query(
            "select mine_id, sector_id, permission_code from sector_access \
             where user_id = $1 order by mine_id, sector_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        let mut grouped: HashMap<(String, String), Vec<String>> = HashMap::new();
        for row in rows {
            let mine_id: String = row.try_get("mine_id")?;
            let sector_id: String = row.try_get("sector_id")?;
            let permission_code: String = row.try_get("permission_code")?;
            grouped
                .entry((mine_id, sector_id))
                .or_default()
                .push(permission_code);
        }
        let mut entries: Vec<SectorAccessRecord> = grouped
            .into_iter()
            .map(|((mine_id, sector_id), mut permissions)| {
                permissions.sort();
                SectorAccessRecord {
                    user_id: user_id.to_string(),
                    mine_id,
                    sector_id,
                    permissions,
                }
            })
            .collect();
        entries.sort_by(|a, b| (&a.mine_id, &a.sector_id).cmp(&(&b.mine_id, &b.sector_id)));
        Ok(entries)
    }

    async fn grant_sector_access(
        &self,
        _ctx: &AuthContext,
        record: SectorAccessRecord,
    ) -> Result<SectorAccessRecord, StorageError> {
        // (user, mine, sector) 组合唯一：重复授予即整体替换
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "delete from sector_access where user_id = $1 and mine_id = $2 and sector_id = $3",
        )
        .bind(&record.user_id)
        .bind(&record.mine_id)
        .bind(&record.sector_id)
        .execute(&mut *tx)
        .await?;
        for permission_code in &record.permissions {
            sqlx::query(
                "insert into sector_access (user_id, mine_id, sector_id, permission_code) \
                 values ($1, $2, $3, $4) on conflict do nothing",
            )
            .bind(&record.user_id)
            .bind(&record.mine_id)
            .bind(&record.sector_id)
            .bind(permission_code)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(record)
    }

    async fn revoke_sector_access(
        &self,
        _ctx: &AuthContext,
        user_id: &str,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "delete from sector_access where user_id = $1 and mine_id = $2 and sector_id = $3",
        )
        .bind(user_id)
        .bind(mine_id)
        .bind(sector_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
