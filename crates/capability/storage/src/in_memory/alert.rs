//! 告警内存存储实现
//!
//! 仅用于本地演示和测试。
//!
//! 未确认告警唯一约束：同一 (entity_key, severity, debounce_slot) 只允许
//! 一条未确认记录，冲突时返回 StorageError::DuplicateOpenAlert
//! （与 Postgres 部分唯一索引对齐）。

use crate::error::StorageError;
use crate::models::{AlertFilter, AlertRecord};
use crate::traits::AlertStore;
use crate::validation::ensure_actor;
use domain::AuthContext;
use std::sync::RwLock;

/// 告警内存存储
pub struct InMemoryAlertStore {
    alerts: RwLock<Vec<AlertRecord>>,
}

impl InMemoryAlertStore {
    pub fn new() -> Self {
        Self {
            alerts: RwLock::new(Vec::new()),
        }
    }

    /// 告警总数（用于测试）
    pub fn len(&self) -> usize {
        self.alerts.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryAlertStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AlertStore for InMemoryAlertStore {
    async fn insert_alert(
        &self,
        ctx: &AuthContext,
        record: AlertRecord,
    ) -> Result<AlertRecord, StorageError> {
        ensure_actor(ctx)?;
        let mut alerts = self
            .alerts
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let open_exists = alerts.iter().any(|alert| {
            !alert.acknowledged
                && alert.entity_key == record.entity_key
                && alert.severity == record.severity
                && alert.debounce_slot == record.debounce_slot
        });
        if open_exists {
            return Err(StorageError::DuplicateOpenAlert);
        }
        alerts.push(record.clone());
        Ok(record)
    }

    async fn list_alerts(
        &self,
        _ctx: &AuthContext,
        filter: AlertFilter,
    ) -> Result<Vec<AlertRecord>, StorageError> {
        let mut alerts: Vec<AlertRecord> = self
            .alerts
            .read()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|alert| {
                        filter
                            .mine_id
                            .as_deref()
                            .map(|mine_id| alert.mine_id == mine_id)
                            .unwrap_or(true)
                            && filter
                                .sector_id
                                .as_deref()
                                .map(|sector_id| alert.sector_id.as_deref() == Some(sector_id))
                                .unwrap_or(true)
                            && filter
                                .severity
                                .as_deref()
                                .map(|severity| alert.severity == severity)
                                .unwrap_or(true)
                            && filter
                                .acknowledged
                                .map(|acknowledged| alert.acknowledged == acknowledged)
                                .unwrap_or(true)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        alerts.sort_by(|a, b| b.raised_at_ms.cmp(&a.raised_at_ms));
        if filter.limit > 0 {
            alerts.truncate(filter.limit as usize);
        }
        Ok(alerts)
    }

    async fn find_alert(
        &self,
        _ctx: &AuthContext,
        alert_id: &str,
    ) -> Result<Option<AlertRecord>, StorageError> {
        Ok(self.alerts.read().ok().and_then(|entries| {
            entries
                .iter()
                .find(|alert| alert.alert_id == alert_id)
                .cloned()
        }))
    }

    async fn acknowledge_alert(
        &self,
        ctx: &AuthContext,
        alert_id: &str,
        acknowledged_by: &str,
        acknowledged_at_ms: i64,
    ) -> Result<Option<AlertRecord>, StorageError> {
        ensure_actor(ctx)?;
        let mut alerts = self
            .alerts
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(alert) = alerts.iter_mut().find(|alert| alert.alert_id == alert_id) else {
            return Ok(None);
        };
        // 幂等：已确认的告警保持首次确认信息不变
        if !alert.acknowledged {
            alert.acknowledged = true;
            alert.acknowledged_by = Some(acknowledged_by.to_string());
            alert.acknowledged_at_ms = Some(acknowledged_at_ms);
        }
        Ok(Some(alert.clone()))
    }

    async fn find_recent_open(
        &self,
        _ctx: &AuthContext,
        entity_key: &str,
        severity: &str,
        since_ms: i64,
    ) -> Result<Option<AlertRecord>, StorageError> {
        Ok(self.alerts.read().ok().and_then(|entries| {
            entries
                .iter()
                .filter(|alert| {
                    !alert.acknowledged
                        && alert.entity_key == entity_key
                        && alert.severity == severity
                        && alert.raised_at_ms >= since_ms
                })
                .max_by_key(|alert| alert.raised_at_ms)
                .cloned()
        }))
    }

    async fn count_open(
        &self,
        _ctx: &AuthContext,
        mine_id: Option<&str>,
    ) -> Result<i64, StorageError> {
        Ok(self
            .alerts
            .read()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|alert| {
                        !alert.acknowledged
                            && mine_id.map(|mine| alert.mine_id == mine).unwrap_or(true)
                    })
                    .count() as i64
            })
            .unwrap_or(0))
    }

    async fn count_acknowledged(
        &self,
        _ctx: &AuthContext,
        mine_id: Option<&str>,
    ) -> Result<i64, StorageError> {
        Ok(self
            .alerts
            .read()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|alert| {
                        alert.acknowledged
                            && mine_id.map(|mine| alert.mine_id == mine).unwrap_or(true)
                    })
                    .count() as i64
            })
            .unwrap_or(0))
    }
}
