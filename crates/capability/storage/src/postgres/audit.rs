//! Postgres 审计日志存储实现

use crate::error::StorageError;
use crate::models::AuditLogRecord;
use crate::traits::AuditLogStore;
use domain::AuthContext;
use sqlx::{PgPool, Row};

pub struct PgAuditLogStore {
    pub pool: PgPool,
}

impl PgAuditLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AuditLogStore for PgAuditLogStore {
    async fn append_audit(
        &self,
        _ctx: &AuthContext,
        record: AuditLogRecord,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "insert into audit_logs (audit_id, user_id, action, detail, ts_ms) \
             values ($1, $2, $3, $4, $5)",
        )
        .bind(&record.audit_id)
        .bind(&record.user_id)
        .bind(&record.action)
        .bind(&record.detail)
        .bind(record.ts_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_audit_logs(
        &self,
        _ctx: &AuthContext,
        from_ms: Option<i64>,
        to_ms: Option<i64>,
        limit: i64,
    ) -> Result<Vec<AuditLogRecord>, StorageError> {
        let limit = if limit > 0 { limit } else { 100 };
        let rows = sqlx::query(
            "select audit_id, user_id, action, detail, ts_ms from audit_logs \
             where ($1::bigint is null or ts_ms >= $1) and ($2::bigint is null or ts_ms <= $2) \
             order by ts_ms desc limit $3",
        )
        .bind(from_ms)
        .bind(to_ms)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(AuditLogRecord {
                audit_id: row.try_get("audit_id")?,
                user_id: row.try_get("user_id")?,
                action: row.try_get("action")?,
                detail: row.try_get("detail")?,
                ts_ms: row.try_get("ts_ms")?,
            });
        }
        Ok(entries)
    }
}
