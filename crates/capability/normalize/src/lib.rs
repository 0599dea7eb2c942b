//! 读数标定能力：原始读数 → 标定读数。
//!
//! 标定依据传感器档案（类型、标定系数、生命周期状态）：
//! - 未登记的传感器 → 丢弃（UnknownSensor）
//! - inactive/maintenance 状态 → 丢弃（InactiveSensor），维护中的读数不参与监测
//! - 其余：value * scale + offset

use async_trait::async_trait;
use domain::{CalibratedReading, RawReading, SensorType};
use minemon_storage::SensorStore;
use std::sync::Arc;

/// 标定所需的传感器档案。
#[derive(Debug, Clone)]
pub struct SensorProfile {
    pub sensor_type: SensorType,
    pub status: String,
    pub location: String,
    pub calibration_scale: f64,
    pub calibration_offset: f64,
}

/// 标定错误。
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("profile provider error: {0}")]
    ProfileProvider(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// 标定结果。
#[derive(Debug)]
pub enum CalibrationOutcome {
    /// 标定成功：读数与传感器位置（用于告警文案）。
    Calibrated {
        reading: CalibratedReading,
        location: String,
    },
    /// 传感器未登记。
    UnknownSensor,
    /// 传感器处于 inactive/maintenance。
    InactiveSensor,
}

/// 传感器档案提供者抽象。
#[async_trait]
pub trait SensorProfileProvider: Send + Sync {
    async fn find_profile(
        &self,
        mine_id: &str,
        sector_id: &str,
        sensor_id: &str,
    ) -> Result<Option<SensorProfile>, NormalizeError>;
}

/// RawReading -> CalibratedReading 的标定实现。
#[derive(Clone)]
pub struct Calibrator {
    provider: Arc<dyn SensorProfileProvider>,
}

impl Calibrator {
    pub fn new(provider: Arc<dyn SensorProfileProvider>) -> Self {
        Self { provider }
    }

    pub async fn calibrate(
        &self,
        reading: RawReading,
    ) -> Result<CalibrationOutcome, NormalizeError> {
        let profile = self
            .provider
            .find_profile(&reading.mine_id, &reading.sector_id, &reading.sensor_id)
            .await?;
        let profile = match profile {
            Some(profile) => profile,
            None => return Ok(CalibrationOutcome::UnknownSensor),
        };
        if profile.status != "active" {
            return Ok(CalibrationOutcome::InactiveSensor);
        }

        let payload_str = std::str::from_utf8(&reading.payload)
            .map_err(|err| NormalizeError::InvalidPayload(err.to_string()))?;
        let raw_value = payload_str
            .trim()
            .parse::<f64>()
            .map_err(|err| NormalizeError::InvalidPayload(err.to_string()))?;
        let value = raw_value * profile.calibration_scale + profile.calibration_offset;

        Ok(CalibrationOutcome::Calibrated {
            reading: CalibratedReading {
                mine_id: reading.mine_id,
                sector_id: reading.sector_id,
                sensor_id: reading.sensor_id,
                sensor_type: profile.sensor_type,
                value,
                ts_ms: reading.received_at_ms,
            },
            location: profile.location,
        })
    }
}

/// 基于 SensorStore 的档案提供者。
pub struct StorageSensorProfileProvider {
    sensors: Arc<dyn SensorStore>,
}

impl StorageSensorProfileProvider {
    pub fn new(sensors: Arc<dyn SensorStore>) -> Self {
        Self { sensors }
    }
}

#[async_trait]
impl SensorProfileProvider for StorageSensorProfileProvider {
    async fn find_profile(
        &self,
        mine_id: &str,
        sector_id: &str,
        sensor_id: &str,
    ) -> Result<Option<SensorProfile>, NormalizeError> {
        let ctx = domain::AuthContext::system();
        let record = self
            .sensors
            .find_sensor(&ctx, mine_id, sector_id, sensor_id)
            .await
            .map_err(|err| NormalizeError::ProfileProvider(err.to_string()))?;
        let Some(record) = record else {
            return Ok(None);
        };
        let Some(sensor_type) = SensorType::parse(&record.sensor_type) else {
            return Err(NormalizeError::ProfileProvider(format!(
                "sensor {} has unknown type {}",
                record.sensor_id, record.sensor_type
            )));
        };
        Ok(Some(SensorProfile {
            sensor_type,
            status: record.status,
            location: record.location,
            calibration_scale: record.calibration_scale,
            calibration_offset: record.calibration_offset,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider {
        profile: Option<SensorProfile>,
    }

    #[async_trait]
    impl SensorProfileProvider for FixedProvider {
        async fn find_profile(
            &self,
            _mine_id: &str,
            _sector_id: &str,
            _sensor_id: &str,
        ) -> Result<Option<SensorProfile>, NormalizeError> {
            Ok(self.profile.clone())
        }
    }

    fn raw(payload: &str) -> RawReading {
        RawReading {
            mine_id: "mine-1".to_string(),
            sector_id: "sector-a".to_string(),
            sensor_id: "sensor-1".to_string(),
            payload: payload.as_bytes().to_vec(),
            received_at_ms: 1_000,
        }
    }

    fn profile(status: &str) -> SensorProfile {
        SensorProfile {
            sensor_type: SensorType::Gas,
            status: status.to_string(),
            location: "north gallery".to_string(),
            calibration_scale: 2.0,
            calibration_offset: 1.0,
        }
    }

    #[tokio::test]
    async fn calibration_applies_scale_and_offset() {
        let calibrator = Calibrator::new(Arc::new(FixedProvider {
            profile: Some(profile("active")),
        }));
        let outcome = calibrator.calibrate(raw("10.5")).await.expect("calibrate");
        match outcome {
            CalibrationOutcome::Calibrated { reading, location } => {
                assert_eq!(reading.value, 22.0);
                assert_eq!(reading.sensor_type, SensorType::Gas);
                assert_eq!(location, "north gallery");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn maintenance_sensor_is_dropped() {
        let calibrator = Calibrator::new(Arc::new(FixedProvider {
            profile: Some(profile("maintenance")),
        }));
        let outcome = calibrator.calibrate(raw("10")).await.expect("calibrate");
        assert!(matches!(outcome, CalibrationOutcome::InactiveSensor));
    }

    #[tokio::test]
    async fn unknown_sensor_is_dropped() {
        let calibrator = Calibrator::new(Arc::new(FixedProvider { profile: None }));
        let outcome = calibrator.calibrate(raw("10")).await.expect("calibrate");
        assert!(matches!(outcome, CalibrationOutcome::UnknownSensor));
    }

    #[tokio::test]
    async fn garbage_payload_is_invalid() {
        let calibrator = Calibrator::new(Arc::new(FixedProvider {
            profile: Some(profile("active")),
        }));
        assert!(calibrator.calibrate(raw("not-a-number")).await.is_err());
    }
}
