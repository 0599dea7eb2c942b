//! Postgres 传感器存储实现

use crate::error::StorageError;
use crate::models::{SensorRecord, SensorUpdate};
use crate::traits::SensorStore;
use crate::validation::ensure_mine_scope;
use domain::AuthContext;
use sqlx::{PgPool, Row};

const SENSOR_COLUMNS: &str = "sensor_id, mine_id, sector_id, sensor_type, location, \
     latitude, longitude, status, calibration_scale, calibration_offset, calibrated_at_ms, \
     manufacturer, model, range_min, range_max";

pub struct PgSensorStore {
    pub pool: PgPool,
}

impl PgSensorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<SensorRecord, StorageError> {
        Ok(SensorRecord {
            sensor_id: row.try_get("sensor_id")?,
            mine_id: row.try_get("mine_id")?,
            sector_id: row.try_get("sector_id")?,
            sensor_type: row.try_get("sensor_type")?,
            location: row.try_get("location")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            status: row.try_get("status")?,
            calibration_scale: row.try_get("calibration_scale")?,
            calibration_offset: row.try_get("calibration_offset")?,
            calibrated_at_ms: row.try_get("calibrated_at_ms")?,
            manufacturer: row.try_get("manufacturer")?,
            model: row.try_get("model")?,
            range_min: row.try_get("range_min")?,
            range_max: row.try_get("range_max")?,
        })
    }
}

#[async_trait::async_trait]
impl SensorStore for PgSensorStore {
    async fn list_sectors_sensors(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<Vec<SensorRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        let rows = sqlx::query(&format!(
            "select {SENSOR_COLUMNS} from sensors where mine_id = $1 and sector_id = $2 \
             order by sensor_id asc"
        ))
        .bind(mine_id)
        .bind(sector_id)
        .fetch_all(&self.pool)
        .await?;
        let mut sensors = Vec::with_capacity(rows.len());
        for row in rows {
            sensors.push(Self::row_to_record(&row)?);
        }
        Ok(sensors)
    }

    async fn list_mine_sensors(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<Vec<SensorRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        let rows = sqlx::query(&format!(
            "select {SENSOR_COLUMNS} from sensors where mine_id = $1 order by sensor_id asc"
        ))
        .bind(mine_id)
        .fetch_all(&self.pool)
        .await?;
        let mut sensors = Vec::with_capacity(rows.len());
        for row in rows {
            sensors.push(Self::row_to_record(&row)?);
        }
        Ok(sensors)
    }

    async fn find_sensor(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
        sensor_id: &str,
    ) -> Result<Option<SensorRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        let row = sqlx::query(&format!(
            "select {SENSOR_COLUMNS} from sensors \
             where mine_id = $1 and sector_id = $2 and sensor_id = $3"
        ))
        .bind(mine_id)
        .bind(sector_id)
        .bind(sensor_id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_sensor(
        &self,
        ctx: &AuthContext,
        record: SensorRecord,
    ) -> Result<SensorRecord, StorageError> {
        ensure_mine_scope(ctx, &record.mine_id)?;
        sqlx::query(
            "insert into sensors (sensor_id, mine_id, sector_id, sensor_type, location, \
             latitude, longitude, status, calibration_scale, calibration_offset, \
             calibrated_at_ms, manufacturer, model, range_min, range_max) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(&record.sensor_id)
        .bind(&record.mine_id)
        .bind(&record.sector_id)
        .bind(&record.sensor_type)
        .bind(&record.location)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(&record.status)
        .bind(record.calibration_scale)
        .bind(record.calibration_offset)
        .bind(record.calibrated_at_ms)
        .bind(&record.manufacturer)
        .bind(&record.model)
        .bind(record.range_min)
        .bind(record.range_max)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn update_sensor(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
        sensor_id: &str,
        update: SensorUpdate,
    ) -> Result<Option<SensorRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        let row = sqlx::query(&format!(
            "update sensors set location = coalesce($4, location), \
             latitude = coalesce($5, latitude), longitude = coalesce($6, longitude), \
             status = coalesce($7, status), \
             calibration_scale = coalesce($8, calibration_scale), \
             calibration_offset = coalesce($9, calibration_offset), \
             calibrated_at_ms = coalesce($10, calibrated_at_ms), \
             manufacturer = coalesce($11, manufacturer), model = coalesce($12, model), \
             range_min = coalesce($13, range_min), range_max = coalesce($14, range_max) \
             where mine_id = $1 and sector_id = $2 and sensor_id = $3 \
             returning {SENSOR_COLUMNS}"
        ))
        .bind(mine_id)
        .bind(sector_id)
        .bind(sensor_id)
        .bind(update.location)
        .bind(update.latitude)
        .bind(update.longitude)
        .bind(update.status)
        .bind(update.calibration_scale)
        .bind(update.calibration_offset)
        .bind(update.calibrated_at_ms)
        .bind(update.manufacturer)
        .bind(update.model)
        .bind(update.range_min)
        .bind(update.range_max)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_sensor(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
        sensor_id: &str,
    ) -> Result<bool, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        let result = sqlx::query(
            "delete from sensors where mine_id = $1 and sector_id = $2 and sensor_id = $3",
        )
        .bind(mine_id)
        .bind(sector_id)
        .bind(sensor_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_sensors_of_sector(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<i64, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        let result = sqlx::query("delete from sensors where mine_id = $1 and sector_id = $2")
            .bind(mine_id)
            .bind(sector_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() as i64)
    }

    async fn delete_sensors_of_mine(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<i64, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        let result = sqlx::query("delete from sensors where mine_id = $1")
            .bind(mine_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() as i64)
    }
}
