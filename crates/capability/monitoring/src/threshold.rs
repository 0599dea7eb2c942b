//! 阈值评估：传感器读数 → 状态分层。
//!
//! 每种传感器类型配置 {warning, critical} 两个边界，
//! 配置时强制 warning < critical；评估是纯函数：
//! - value < warning          → Normal
//! - warning <= value < critical → Warning
//! - value >= critical        → Critical
//!
//! 表中缺失的传感器类型在评估时显式失败（不回落到任何默认档位）。

use domain::{SensorType, StatusTier};
use std::collections::HashMap;

/// 单个传感器类型的阈值边界。
#[derive(Debug, Clone, Copy)]
pub struct ThresholdBounds {
    pub warning: f64,
    pub critical: f64,
}

/// 阈值配置错误。
#[derive(Debug, thiserror::Error)]
pub enum ThresholdError {
    #[error("invalid bounds for {sensor_type}: warning {warning} must be below critical {critical}")]
    InvalidBounds {
        sensor_type: String,
        warning: f64,
        critical: f64,
    },
    #[error("unknown sensor type: {0}")]
    UnknownSensorType(String),
    #[error("invalid thresholds json: {0}")]
    InvalidJson(String),
}

/// 各传感器类型的阈值表。
#[derive(Debug, Clone)]
pub struct ThresholdTable {
    bounds: HashMap<SensorType, ThresholdBounds>,
}

#[derive(serde::Deserialize)]
struct BoundsOverride {
    warning: f64,
    critical: f64,
}

impl ThresholdTable {
    /// 从显式条目构建阈值表；warning >= critical 的条目拒绝。
    pub fn new(
        entries: impl IntoIterator<Item = (SensorType, ThresholdBounds)>,
    ) -> Result<Self, ThresholdError> {
        let mut bounds = HashMap::new();
        for (sensor_type, entry) in entries {
            if entry.warning >= entry.critical {
                return Err(ThresholdError::InvalidBounds {
                    sensor_type: sensor_type.as_str().to_string(),
                    warning: entry.warning,
                    critical: entry.critical,
                });
            }
            bounds.insert(sensor_type, entry);
        }
        Ok(Self { bounds })
    }

    /// 全部传感器类型的出厂默认边界。
    pub fn defaults() -> Self {
        let mut bounds = HashMap::new();
        bounds.insert(SensorType::Gas, ThresholdBounds { warning: 50.0, critical: 100.0 });
        bounds.insert(SensorType::Temperature, ThresholdBounds { warning: 35.0, critical: 45.0 });
        bounds.insert(SensorType::Seismic, ThresholdBounds { warning: 4.0, critical: 7.0 });
        bounds.insert(SensorType::Strain, ThresholdBounds { warning: 60.0, critical: 85.0 });
        bounds.insert(SensorType::Geological, ThresholdBounds { warning: 150.0, critical: 250.0 });
        Self { bounds }
    }

    /// 默认表 + JSON 覆盖（配置来源：环境变量）。
    ///
    /// 格式：{"gas": {"warning": 50, "critical": 100}, ...}
    /// 未知类型名与非法边界在加载时报错，属于启动期致命错误。
    pub fn defaults_with_overrides_json(json: &str) -> Result<Self, ThresholdError> {
        let overrides: HashMap<String, BoundsOverride> =
            serde_json::from_str(json).map_err(|err| ThresholdError::InvalidJson(err.to_string()))?;
        let mut table = Self::defaults();
        for (name, entry) in overrides {
            let Some(sensor_type) = SensorType::parse(&name) else {
                return Err(ThresholdError::UnknownSensorType(name));
            };
            if entry.warning >= entry.critical {
                return Err(ThresholdError::InvalidBounds {
                    sensor_type: name,
                    warning: entry.warning,
                    critical: entry.critical,
                });
            }
            table.bounds.insert(
                sensor_type,
                ThresholdBounds {
                    warning: entry.warning,
                    critical: entry.critical,
                },
            );
        }
        Ok(table)
    }

    /// 查询某类型的边界。
    pub fn bounds(&self, sensor_type: SensorType) -> Option<ThresholdBounds> {
        self.bounds.get(&sensor_type).copied()
    }

    /// 纯评估：读数值 → 状态分层。
    pub fn evaluate(
        &self,
        sensor_type: SensorType,
        value: f64,
    ) -> Result<StatusTier, ThresholdError> {
        let bounds = self.bounds.get(&sensor_type).ok_or_else(|| {
            ThresholdError::UnknownSensorType(sensor_type.as_str().to_string())
        })?;
        if value >= bounds.critical {
            Ok(StatusTier::Critical)
        } else if value >= bounds.warning {
            Ok(StatusTier::Warning)
        } else {
            Ok(StatusTier::Normal)
        }
    }
}
