//! Postgres 告警存储实现
//!
//! 部分唯一索引 alerts_open_entity_severity_key
//! (entity_key, severity, debounce_slot) where not acknowledged 保证同一
//! 实体同一严重级在一个去抖窗口内只有一条未确认告警；
//! 并发插入的落败方经 From<sqlx::Error> 映射为 DuplicateOpenAlert。

use crate::error::StorageError;
use crate::models::{AlertFilter, AlertRecord};
use crate::traits::AlertStore;
use domain::AuthContext;
use sqlx::{PgPool, Row};

const ALERT_COLUMNS: &str = "alert_id, entity_key, severity, debounce_slot, message, location, \
     mine_id, sector_id, sensor_id, raised_at_ms, acknowledged, acknowledged_by, acknowledged_at_ms";

pub struct PgAlertStore {
    pub pool: PgPool,
}

impl PgAlertStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<AlertRecord, StorageError> {
        Ok(AlertRecord {
            alert_id: row.try_get("alert_id")?,
            entity_key: row.try_get("entity_key")?,
            severity: row.try_get("severity")?,
            debounce_slot: row.try_get("debounce_slot")?,
            message: row.try_get("message")?,
            location: row.try_get("location")?,
            mine_id: row.try_get("mine_id")?,
            sector_id: row.try_get("sector_id")?,
            sensor_id: row.try_get("sensor_id")?,
            raised_at_ms: row.try_get("raised_at_ms")?,
            acknowledged: row.try_get("acknowledged")?,
            acknowledged_by: row.try_get("acknowledged_by")?,
            acknowledged_at_ms: row.try_get("acknowledged_at_ms")?,
        })
    }
}

#[async_trait::async_trait]
impl AlertStore for PgAlertStore {
    async fn insert_alert(
        &self,
        _ctx: &AuthContext,
        record: AlertRecord,
    ) -> Result<AlertRecord, StorageError> {
        sqlx::query(
            "insert into alerts (alert_id, entity_key, severity, debounce_slot, message, location, \
             mine_id, sector_id, sensor_id, raised_at_ms, acknowledged, acknowledged_by, \
             acknowledged_at_ms) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(&record.alert_id)
        .bind(&record.entity_key)
        .bind(&record.severity)
        .bind(record.debounce_slot)
        .bind(&record.message)
        .bind(&record.location)
        .bind(&record.mine_id)
        .bind(&record.sector_id)
        .bind(&record.sensor_id)
        .bind(record.raised_at_ms)
        .bind(record.acknowledged)
        .bind(&record.acknowledged_by)
        .bind(record.acknowledged_at_ms)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_alerts(
        &self,
        _ctx: &AuthContext,
        filter: AlertFilter,
    ) -> Result<Vec<AlertRecord>, StorageError> {
        let limit = if filter.limit > 0 { filter.limit } else { 100 };
        let rows = sqlx::query(&format!(
            "select {ALERT_COLUMNS} from alerts \
             where ($1::text is null or mine_id = $1) \
               and ($2::text is null or sector_id = $2) \
               and ($3::text is null or severity = $3) \
               and ($4::bool is null or acknowledged = $4) \
             order by raised_at_ms desc limit $5"
        ))
        .bind(filter.mine_id)
        .bind(filter.sector_id)
        .bind(filter.severity)
        .bind(filter.acknowledged)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        let mut alerts = Vec::with_capacity(rows.len());
        for row in rows {
            alerts.push(Self::row_to_record(&row)?);
        }
        Ok(alerts)
    }

    async fn find_alert(
        &self,
        _ctx: &AuthContext,
        alert_id: &str,
    ) -> Result<Option<AlertRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "select {ALERT_COLUMNS} from alerts where alert_id = $1"
        ))
        .bind(alert_id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn acknowledge_alert(
        &self,
        _ctx: &AuthContext,
        alert_id: &str,
        acknowledged_by: &str,
        acknowledged_at_ms: i64,
    ) -> Result<Option<AlertRecord>, StorageError> {
        // 幂等：只有未确认记录被改写，已确认记录原样返回
        let row = sqlx::query(&format!(
            "update alerts set acknowledged = true, \
             acknowledged_by = case when acknowledged then acknowledged_by else $2 end, \
             acknowledged_at_ms = case when acknowledged then acknowledged_at_ms else $3 end \
             where alert_id = $1 \
             returning {ALERT_COLUMNS}"
        ))
        .bind(alert_id)
        .bind(acknowledged_by)
        .bind(acknowledged_at_ms)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_recent_open(
        &self,
        _ctx: &AuthContext,
        entity_key: &str,
        severity: &str,
        since_ms: i64,
    ) -> Result<Option<AlertRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "select {ALERT_COLUMNS} from alerts \
             where entity_key = $1 and severity = $2 and not acknowledged \
               and raised_at_ms >= $3 \
             order by raised_at_ms desc limit 1"
        ))
        .bind(entity_key)
        .bind(severity)
        .bind(since_ms)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn count_open(
        &self,
        _ctx: &AuthContext,
        mine_id: Option<&str>,
    ) -> Result<i64, StorageError> {
        let count: i64 = sqlx::query_scalar(
            "select count(*) from alerts \
             where not acknowledged and ($1::text is null or mine_id = $1)",
        )
        .bind(mine_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count_acknowledged(
        &self,
        _ctx: &AuthContext,
        mine_id: Option<&str>,
    ) -> Result<i64, StorageError> {
        let count: i64 = sqlx::query_scalar(
            "select count(*) from alerts \
             where acknowledged and ($1::text is null or mine_id = $1)",
        )
        .bind(mine_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
