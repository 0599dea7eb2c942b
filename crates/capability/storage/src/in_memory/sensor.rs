//! 传感器内存存储实现
//!
//! 仅用于本地演示和测试。

use crate::error::StorageError;
use crate::models::{SensorRecord, SensorUpdate};
use crate::traits::SensorStore;
use crate::validation::{ensure_actor, ensure_mine_scope};
use domain::AuthContext;
use std::sync::RwLock;

/// 传感器内存存储
pub struct InMemorySensorStore {
    sensors: RwLock<Vec<SensorRecord>>,
}

impl InMemorySensorStore {
    pub fn new() -> Self {
        Self {
            sensors: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemorySensorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_update(sensor: &mut SensorRecord, update: SensorUpdate) {
    if let Some(location) = update.location {
        sensor.location = location;
    }
    if let Some(latitude) = update.latitude {
        sensor.latitude = latitude;
    }
    if let Some(longitude) = update.longitude {
        sensor.longitude = longitude;
    }
    if let Some(status) = update.status {
        sensor.status = status;
    }
    if let Some(scale) = update.calibration_scale {
        sensor.calibration_scale = scale;
    }
    if let Some(offset) = update.calibration_offset {
        sensor.calibration_offset = offset;
    }
    if let Some(calibrated_at_ms) = update.calibrated_at_ms {
        sensor.calibrated_at_ms = Some(calibrated_at_ms);
    }
    if let Some(manufacturer) = update.manufacturer {
        sensor.manufacturer = Some(manufacturer);
    }
    if let Some(model) = update.model {
        sensor.model = Some(model);
    }
    if let Some(range_min) = update.range_min {
        sensor.range_min = Some(range_min);
    }
    if let Some(range_max) = update.range_max {
        sensor.range_max = Some(range_max);
    }
}

#[async_trait::async_trait]
impl SensorStore for InMemorySensorStore {
    async fn list_sectors_sensors(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<Vec<SensorRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        Ok(self
            .sensors
            .read()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|sensor| sensor.mine_id == mine_id && sensor.sector_id == sector_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_mine_sensors(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<Vec<SensorRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        Ok(self
            .sensors
            .read()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|sensor| sensor.mine_id == mine_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_sensor(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
        sensor_id: &str,
    ) -> Result<Option<SensorRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        Ok(self.sensors.read().ok().and_then(|entries| {
            entries
                .iter()
                .find(|sensor| {
                    sensor.mine_id == mine_id
                        && sensor.sector_id == sector_id
                        && sensor.sensor_id == sensor_id
                })
                .cloned()
        }))
    }

    async fn create_sensor(
        &self,
        ctx: &AuthContext,
        record: SensorRecord,
    ) -> Result<SensorRecord, StorageError> {
        ensure_actor(ctx)?;
        ensure_mine_scope(ctx, &record.mine_id)?;
        let mut sensors = self
            .sensors
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        sensors.push(record.clone());
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
        ensure_actor(ctx)?;
        ensure_mine_scope(ctx, mine_id)?;
        let mut sensors = self
            .sensors
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(sensor) = sensors.iter_mut().find(|sensor| {
            sensor.mine_id == mine_id
                && sensor.sector_id == sector_id
                && sensor.sensor_id == sensor_id
        }) else {
            return Ok(None);
        };
        apply_update(sensor, update);
        Ok(Some(sensor.clone()))
    }

    async fn delete_sensor(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
        sensor_id: &str,
    ) -> Result<bool, StorageError> {
        ensure_actor(ctx)?;
        ensure_mine_scope(ctx, mine_id)?;
        let mut sensors = self
            .sensors
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let before = sensors.len();
        sensors.retain(|sensor| {
            !(sensor.mine_id == mine_id
                && sensor.sector_id == sector_id
                && sensor.sensor_id == sensor_id)
        });
        Ok(sensors.len() < before)
    }

    async fn delete_sensors_of_sector(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<i64, StorageError> {
        ensure_actor(ctx)?;
        ensure_mine_scope(ctx, mine_id)?;
        let mut sensors = self
            .sensors
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let before = sensors.len();
        sensors.retain(|sensor| !(sensor.mine_id == mine_id && sensor.sector_id == sector_id));
        Ok((before - sensors.len()) as i64)
    }

    async fn delete_sensors_of_mine(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<i64, StorageError> {
        ensure_actor(ctx)?;
        ensure_mine_scope(ctx, mine_id)?;
        let mut sensors = self
            .sensors
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let before = sensors.len();
        sensors.retain(|sensor| sensor.mine_id != mine_id);
        Ok((before - sensors.len()) as i64)
    }
}
