//! Redis 实时读数存储实现
//!
//! 每个传感器一个 key，保存最新标定读数与状态分层；
//! 可选 TTL 让长期无读数的传感器自动回到"无数据"状态。

use crate::error::StorageError;
use crate::models::SensorReadingRecord;
use crate::traits::RealtimeStore;
use crate::validation::ensure_mine_scope;
use domain::AuthContext;
use redis::AsyncCommands;

#[derive(serde::Serialize, serde::Deserialize)]
struct LastReadingPayload {
    sensor_type: String,
    value: f64,
    tier: String,
    ts_ms: i64,
}

fn reading_key(mine_id: &str, sector_id: &str, sensor_id: &str) -> String {
    format!(
        "mine:{}:sector:{}:sensor:{}:last_reading",
        mine_id, sector_id, sensor_id
    )
}

/// 从 key 中解析 (mine_id, sector_id, sensor_id)。
fn parse_reading_key(key: &str) -> Option<(String, String, String)> {
    let rest = key.strip_prefix("mine:")?;
    let (mine_id, rest) = rest.split_once(":sector:")?;
    let (sector_id, rest) = rest.split_once(":sensor:")?;
    let sensor_id = rest.strip_suffix(":last_reading")?;
    Some((
        mine_id.to_string(),
        sector_id.to_string(),
        sensor_id.to_string(),
    ))
}

/// Redis 实时读数存储
pub struct RedisRealtimeStore {
    client: redis::Client,
    last_reading_ttl_seconds: Option<u64>,
}

impl RedisRealtimeStore {
    pub fn new(client: redis::Client) -> Self {
        Self {
            client,
            last_reading_ttl_seconds: None,
        }
    }

    pub fn connect(redis_url: &str) -> Result<Self, StorageError> {
        let client =
            redis::Client::open(redis_url).map_err(|err| StorageError::new(err.to_string()))?;
        Ok(Self::new(client))
    }

    pub fn connect_with_ttl(
        redis_url: &str,
        last_reading_ttl_seconds: Option<u64>,
    ) -> Result<Self, StorageError> {
        let client =
            redis::Client::open(redis_url).map_err(|err| StorageError::new(err.to_string()))?;
        let ttl = last_reading_ttl_seconds.filter(|value| *value > 0);
        Ok(Self {
            client,
            last_reading_ttl_seconds: ttl,
        })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, StorageError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| StorageError::new(err.to_string()))
    }

    async fn list_by_pattern(
        &self,
        pattern: &str,
    ) -> Result<Vec<SensorReadingRecord>, StorageError> {
        let mut conn = self.connection().await?;
        let mut keys: Vec<String> = Vec::new();
        {
            let mut iter: redis::AsyncIter<String> = conn
                .scan_match(pattern)
                .await
                .map_err(|err| StorageError::new(err.to_string()))?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        let mut readings = Vec::with_capacity(keys.len());
        for key in keys {
            let Some((mine_id, sector_id, sensor_id)) = parse_reading_key(&key) else {
                continue;
            };
            let raw: Option<String> = conn
                .get(&key)
                .await
                .map_err(|err| StorageError::new(err.to_string()))?;
            let Some(raw) = raw else {
                continue;
            };
            let payload: LastReadingPayload = serde_json::from_str(&raw)
                .map_err(|err| StorageError::new(err.to_string()))?;
            readings.push(SensorReadingRecord {
                mine_id,
                sector_id,
                sensor_id,
                sensor_type: payload.sensor_type,
                value: payload.value,
                tier: payload.tier,
                ts_ms: payload.ts_ms,
            });
        }
        Ok(readings)
    }
}

#[async_trait::async_trait]
impl RealtimeStore for RedisRealtimeStore {
    async fn upsert_reading(
        &self,
        ctx: &AuthContext,
        record: &SensorReadingRecord,
    ) -> Result<(), StorageError> {
        ensure_mine_scope(ctx, &record.mine_id)?;
        let payload = LastReadingPayload {
            sensor_type: record.sensor_type.clone(),
            value: record.value,
            tier: record.tier.clone(),
            ts_ms: record.ts_ms,
        };
        let raw = serde_json::to_string(&payload)
            .map_err(|err| StorageError::new(err.to_string()))?;
        let key = reading_key(&record.mine_id, &record.sector_id, &record.sensor_id);
        let mut conn = self.connection().await?;
        match self.last_reading_ttl_seconds {
            Some(ttl) => conn
                .set_ex::<_, _, ()>(key, raw, ttl)
                .await
                .map_err(|err| StorageError::new(err.to_string()))?,
            None => conn
                .set::<_, _, ()>(key, raw)
                .await
                .map_err(|err| StorageError::new(err.to_string()))?,
        }
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
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn
            .get(reading_key(mine_id, sector_id, sensor_id))
            .await
            .map_err(|err| StorageError::new(err.to_string()))?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let payload: LastReadingPayload =
            serde_json::from_str(&raw).map_err(|err| StorageError::new(err.to_string()))?;
        Ok(Some(SensorReadingRecord {
            mine_id: mine_id.to_string(),
            sector_id: sector_id.to_string(),
            sensor_id: sensor_id.to_string(),
            sensor_type: payload.sensor_type,
            value: payload.value,
            tier: payload.tier,
            ts_ms: payload.ts_ms,
        }))
    }

    async fn list_sector_readings(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<Vec<SensorReadingRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        self.list_by_pattern(&format!(
            "mine:{}:sector:{}:sensor:*:last_reading",
            mine_id, sector_id
        ))
        .await
    }

    async fn list_mine_readings(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<Vec<SensorReadingRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        self.list_by_pattern(&format!("mine:{}:sector:*:sensor:*:last_reading", mine_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::parse_reading_key;

    #[test]
    fn reading_key_round_trips() {
        let key = super::reading_key("mine-1", "sector-2", "sensor-3");
        assert_eq!(
            parse_reading_key(&key),
            Some((
                "mine-1".to_string(),
                "sector-2".to_string(),
                "sensor-3".to_string()
            ))
        );
        assert_eq!(parse_reading_key("mine:only"), None);
    }
}
