//! 实时读数内存实现
//!
//! 仅用于本地测试和占位。

use crate::error::StorageError;
use crate::models::SensorReadingRecord;
use crate::traits::RealtimeStore;
use crate::validation::ensure_mine_scope;
use domain::AuthContext;
use std::collections::HashMap;
use std::sync::RwLock;

fn reading_key(mine_id: &str, sector_id: &str, sensor_id: &str) -> String {
    format!("mine:{}:sector:{}:sensor:{}", mine_id, sector_id, sensor_id)
}

/// 实时读数内存存储
pub struct InMemoryRealtimeStore {
    readings: RwLock<HashMap<String, SensorReadingRecord>>,
}

impl InMemoryRealtimeStore {
    /// 创建新的实时存储
    pub fn new() -> Self {
        Self {
            readings: RwLock::new(HashMap::new()),
        }
    }

    /// 当前条目数量（用于测试）
    pub fn len(&self) -> usize {
        self.readings.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryRealtimeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RealtimeStore for InMemoryRealtimeStore {
    async fn upsert_reading(
        &self,
        ctx: &AuthContext,
        record: &SensorReadingRecord,
    ) -> Result<(), StorageError> {
        ensure_mine_scope(ctx, &record.mine_id)?;
        let mut readings = self
            .readings
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        readings.insert(
            reading_key(&record.mine_id, &record.sector_id, &record.sensor_id),
            record.clone(),
        );
        Ok(())
    }

    async fn get_reading(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
        sensor_id: &str,
    ) -> Result<Option<SensorReadingRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        Ok(self
            .readings
            .read()
            .ok()
            .and_then(|map| map.get(&reading_key(mine_id, sector_id, sensor_id)).cloned()))
    }

    async fn list_sector_readings(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<Vec<SensorReadingRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        Ok(self
            .readings
            .read()
            .map(|map| {
                map.values()
                    .filter(|reading| {
                        reading.mine_id == mine_id && reading.sector_id == sector_id
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_mine_readings(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<Vec<SensorReadingRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        Ok(self
            .readings
            .read()
            .map(|map| {
                map.values()
                    .filter(|reading| reading.mine_id == mine_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
