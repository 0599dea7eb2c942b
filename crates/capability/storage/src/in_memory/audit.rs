//! 审计日志内存存储实现
//!
//! 仅用于本地测试和占位。

use crate::error::StorageError;
use crate::models::AuditLogRecord;
use crate::traits::AuditLogStore;
use crate::validation::ensure_actor;
use domain::AuthContext;
use std::sync::RwLock;

/// 审计日志内存存储
pub struct InMemoryAuditLogStore {
    entries: RwLock<Vec<AuditLogRecord>>,
}

impl InMemoryAuditLogStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryAuditLogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AuditLogStore for InMemoryAuditLogStore {
    async fn append_audit(
        &self,
        ctx: &AuthContext,
        record: AuditLogRecord,
    ) -> Result<(), StorageError> {
        ensure_actor(ctx)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        entries.push(record);
        Ok(())
    }

    async fn list_audit_logs(
        &self,
        _ctx: &AuthContext,
        from_ms: Option<i64>,
        to_ms: Option<i64>,
        limit: i64,
    ) -> Result<Vec<AuditLogRecord>, StorageError> {
        let mut entries: Vec<AuditLogRecord> = self
            .entries
            .read()
            .map(|all| {
                all.iter()
                    .filter(|entry| {
                        from_ms.map(|from| entry.ts_ms >= from).unwrap_or(true)
                            && to_ms.map(|to| entry.ts_ms <= to).unwrap_or(true)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by(|a, b| b.ts_ms.cmp(&a.ts_ms));
        if limit > 0 {
            entries.truncate(limit as usize);
        }
        Ok(entries)
    }
}
