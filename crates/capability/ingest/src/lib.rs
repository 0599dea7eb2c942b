//! 读数接入能力：数据源抽象与具体实现。
//!
//! - MqttSource：订阅井下网关发布的读数主题
//! - SimulatedSource：按节拍为登记在册的 active 传感器生成模拟读数
//!   （演示/联调用，与真实数据源走完全相同的处理链路）
//! - NoopSource：占位

use async_trait::async_trait;
use domain::RawReading;
use minemon_storage::{MineStore, SensorStore};
use rand_core::{OsRng, RngCore};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// 采集错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("handler error: {0}")]
    Handler(String),
    #[error("source error: {0}")]
    Source(String),
}

/// RawReading 处理器。
#[async_trait]
pub trait ReadingHandler: Send + Sync {
    async fn handle(&self, reading: RawReading) -> Result<(), IngestError>;
}

/// 采集源抽象。
#[async_trait]
pub trait Source: Send + Sync {
    async fn run(&self, handler: Arc<dyn ReadingHandler>) -> Result<(), IngestError>;
}

/// 占位源（用于接线与测试）。
#[derive(Debug, Default)]
pub struct NoopSource;

#[async_trait]
impl Source for NoopSource {
    async fn run(&self, _handler: Arc<dyn ReadingHandler>) -> Result<(), IngestError> {
        Ok(())
    }
}

// ============================================================================
// MQTT 源
// ============================================================================

/// MQTT 采集源配置。
#[derive(Debug, Clone)]
pub struct MqttSourceConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// 读数主题前缀：{prefix}/{mine_id}/{sector_id}/{sensor_id}
    pub topic_prefix: String,
}

/// MQTT 采集源。
#[derive(Debug, Clone)]
pub struct MqttSource {
    config: MqttSourceConfig,
}

impl MqttSource {
    pub fn new(config: MqttSourceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MqttSourceConfig {
        &self.config
    }
}

#[async_trait]
impl Source for MqttSource {
    async fn run(&self, handler: Arc<dyn ReadingHandler>) -> Result<(), IngestError> {
        let client_id = format!("minemon-ingest-{}", now_epoch_ms());
        let mut options =
            rumqttc::MqttOptions::new(client_id, self.config.host.clone(), self.config.port);
        options.set_keep_alive(Duration::from_secs(30));
        if let (Some(username), Some(password)) =
            (self.config.username.as_ref(), self.config.password.as_ref())
        {
            options.set_credentials(username, password);
        }

        let (client, mut eventloop) = rumqttc::AsyncClient::new(options, 10);
        let topic = format!("{}/#", self.config.topic_prefix.trim_end_matches('/'));
        client
            .subscribe(topic, rumqttc::QoS::AtMostOnce)
            .await
            .map_err(|err| IngestError::Source(err.to_string()))?;

        loop {
            match eventloop.poll().await {
                Ok(rumqttc::Event::Incoming(rumqttc::Packet::Publish(publish))) => {
                    let Some((mine_id, sector_id, sensor_id)) =
                        extract_scope(&self.config.topic_prefix, &publish.topic)
                    else {
                        warn!("mqtt topic skipped: {}", publish.topic);
                        continue;
                    };
                    let reading = RawReading {
                        mine_id,
                        sector_id,
                        sensor_id,
                        payload: publish.payload.to_vec(),
                        received_at_ms: now_epoch_ms(),
                    };
                    if let Err(err) = handler.handle(reading).await {
                        warn!("reading handler failed: {}", err);
                    }
                }
                Ok(_) => {}
                Err(err) => return Err(IngestError::Source(err.to_string())),
            }
        }
    }
}

/// 从主题中解析 (mine_id, sector_id, sensor_id)。
fn extract_scope(prefix: &str, topic: &str) -> Option<(String, String, String)> {
    let prefix = prefix.trim_matches('/');
    let topic = topic.trim_matches('/');
    let rest = if prefix.is_empty() {
        topic
    } else {
        topic.strip_prefix(prefix)?
    };
    let rest = rest.trim_start_matches('/');
    let mut parts = rest.split('/');
    let mine_id = parts.next()?;
    let sector_id = parts.next()?;
    let sensor_id = parts.next()?;
    if mine_id.is_empty() || sector_id.is_empty() || sensor_id.is_empty() || parts.next().is_some()
    {
        return None;
    }
    Some((
        mine_id.to_string(),
        sector_id.to_string(),
        sensor_id.to_string(),
    ))
}

// ============================================================================
// 模拟源
// ============================================================================

/// 模拟源配置。
#[derive(Debug, Clone)]
pub struct SimulatedSourceConfig {
    /// 读数节拍（毫秒）。
    pub interval_ms: u64,
    /// 产生 warning 级读数的概率（0..1）。
    pub warning_ratio: f64,
    /// 产生 critical 级读数的概率（0..1）。
    pub critical_ratio: f64,
}

impl Default for SimulatedSourceConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            warning_ratio: 0.06,
            critical_ratio: 0.02,
        }
    }
}

/// 模拟采集源：为所有登记在册的 active 传感器按节拍生成读数。
///
/// 读数幅值按传感器类型取量程内的典型区间，
/// 小概率越入 warning/critical 区间以驱动告警链路演示。
pub struct SimulatedSource {
    mines: Arc<dyn MineStore>,
    sensors: Arc<dyn SensorStore>,
    config: SimulatedSourceConfig,
}

impl SimulatedSource {
    pub fn new(
        mines: Arc<dyn MineStore>,
        sensors: Arc<dyn SensorStore>,
        config: SimulatedSourceConfig,
    ) -> Self {
        Self {
            mines,
            sensors,
            config,
        }
    }

    fn sample_value(&self, sensor_type: &str) -> f64 {
        // 各档位区间（normal / warning / critical），与默认阈值表对齐
        let (normal, warning, critical) = match sensor_type {
            "gas" => ((5.0, 45.0), (50.0, 95.0), (100.0, 180.0)),
            "temperature" => ((18.0, 33.0), (35.0, 44.0), (45.0, 60.0)),
            "seismic" => ((0.1, 3.5), (4.0, 6.5), (7.0, 12.0)),
            "strain" => ((10.0, 55.0), (60.0, 82.0), (85.0, 120.0)),
            "geological" => ((40.0, 140.0), (150.0, 240.0), (250.0, 400.0)),
            _ => ((0.0, 1.0), (1.0, 2.0), (2.0, 3.0)),
        };
        let roll = random_unit();
        let (low, high) = if roll < self.config.critical_ratio {
            critical
        } else if roll < self.config.critical_ratio + self.config.warning_ratio {
            warning
        } else {
            normal
        };
        low + random_unit() * (high - low)
    }
}

#[async_trait]
impl Source for SimulatedSource {
    async fn run(&self, handler: Arc<dyn ReadingHandler>) -> Result<(), IngestError> {
        let ctx = domain::AuthContext::system();
        let mut ticker =
            tokio::time::interval(Duration::from_millis(self.config.interval_ms.max(100)));
        loop {
            ticker.tick().await;
            let mines = self
                .mines
                .list_mines(&ctx)
                .await
                .map_err(|err| IngestError::Source(err.to_string()))?;
            for mine in mines {
                let sensors = self
                    .sensors
                    .list_mine_sensors(&ctx, &mine.mine_id)
                    .await
                    .map_err(|err| IngestError::Source(err.to_string()))?;
                for sensor in sensors {
                    if sensor.status != "active" {
                        continue;
                    }
                    let value = self.sample_value(&sensor.sensor_type);
                    let reading = RawReading {
                        mine_id: sensor.mine_id,
                        sector_id: sensor.sector_id,
                        sensor_id: sensor.sensor_id,
                        payload: format!("{value:.2}").into_bytes(),
                        received_at_ms: now_epoch_ms(),
                    };
                    if let Err(err) = handler.handle(reading).await {
                        warn!("reading handler failed: {}", err);
                    }
                }
            }
        }
    }
}

/// [0, 1) 均匀随机数。
fn random_unit() -> f64 {
    let mut buf = [0u8; 8];
    OsRng.fill_bytes(&mut buf);
    (u64::from_le_bytes(buf) >> 11) as f64 / (1u64 << 53) as f64
}

fn now_epoch_ms() -> i64 {
    let now = std::time::SystemTime::now();
    let duration = now
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::extract_scope;

    #[test]
    fn scope_extraction_matches_topic_layout() {
        assert_eq!(
            extract_scope("minemon/readings", "minemon/readings/mine-1/sector-a/sensor-9"),
            Some((
                "mine-1".to_string(),
                "sector-a".to_string(),
                "sensor-9".to_string()
            ))
        );
        assert_eq!(extract_scope("minemon/readings", "minemon/readings/mine-1"), None);
        assert_eq!(
            extract_scope("minemon/readings", "minemon/readings/m/s/x/extra"),
            None
        );
        assert_eq!(extract_scope("other", "minemon/readings/m/s/x"), None);
    }

    #[test]
    fn random_unit_stays_in_range() {
        for _ in 0..1000 {
            let value = super::random_unit();
            assert!((0.0..1.0).contains(&value));
        }
    }
}
