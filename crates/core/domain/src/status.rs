//! 状态分层与受监测实体标识。
//!
//! - StatusTier：normal < warning < critical 的全序分层
//! - AlertSeverity：告警严重级（info 仅用于系统消息，不来自阈值）
//! - SensorType：传感器类型封闭枚举（类型与单位固定）
//! - MonitoredEntity：告警基线与去抖使用的实体键

/// 状态分层，全序：Normal < Warning < Critical。
///
/// 派生 Ord 使"取最差"聚合可以直接用 max 表达。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusTier {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl StatusTier {
    /// 序列化用小写编码。
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTier::Normal => "normal",
            StatusTier::Warning => "warning",
            StatusTier::Critical => "critical",
        }
    }

    /// 从编码解析，未知编码返回 None。
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "normal" => Some(StatusTier::Normal),
            "warning" => Some(StatusTier::Warning),
            "critical" => Some(StatusTier::Critical),
            _ => None,
        }
    }
}

/// 告警严重级。
///
/// Warning/Critical 来自阈值越限；Info 保留给系统消息，阈值转换永不产生。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "info" => Some(AlertSeverity::Info),
            "warning" => Some(AlertSeverity::Warning),
            "critical" => Some(AlertSeverity::Critical),
            _ => None,
        }
    }

    /// 由状态分层导出严重级；Normal 不对应任何告警。
    pub fn from_tier(tier: StatusTier) -> Option<Self> {
        match tier {
            StatusTier::Normal => None,
            StatusTier::Warning => Some(AlertSeverity::Warning),
            StatusTier::Critical => Some(AlertSeverity::Critical),
        }
    }
}

/// 传感器类型封闭枚举。
///
/// 新增类型只需要补充阈值配置项，不需要修改评估逻辑。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorType {
    Gas,
    Temperature,
    Seismic,
    Strain,
    Geological,
}

impl SensorType {
    /// 全部类型（用于默认阈值表与模拟数据源）。
    pub const ALL: [SensorType; 5] = [
        SensorType::Gas,
        SensorType::Temperature,
        SensorType::Seismic,
        SensorType::Strain,
        SensorType::Geological,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Gas => "gas",
            SensorType::Temperature => "temperature",
            SensorType::Seismic => "seismic",
            SensorType::Strain => "strain",
            SensorType::Geological => "geological",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "gas" => Some(SensorType::Gas),
            "temperature" => Some(SensorType::Temperature),
            "seismic" => Some(SensorType::Seismic),
            "strain" => Some(SensorType::Strain),
            "geological" => Some(SensorType::Geological),
            _ => None,
        }
    }

    /// 读数单位约定。
    pub fn unit(&self) -> &'static str {
        match self {
            SensorType::Gas => "PPM",
            SensorType::Temperature => "°C",
            SensorType::Seismic => "Hz",
            SensorType::Strain => "MPa",
            SensorType::Geological => "kPa",
        }
    }
}

/// 受监测实体：传感器、分区或矿井。
///
/// key() 产生稳定字符串键，作为告警基线与未确认告警唯一约束的键。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MonitoredEntity {
    Mine {
        mine_id: String,
    },
    Sector {
        mine_id: String,
        sector_id: String,
    },
    Sensor {
        mine_id: String,
        sector_id: String,
        sensor_id: String,
    },
}

impl MonitoredEntity {
    pub fn mine(mine_id: impl Into<String>) -> Self {
        MonitoredEntity::Mine {
            mine_id: mine_id.into(),
        }
    }

    pub fn sector(mine_id: impl Into<String>, sector_id: impl Into<String>) -> Self {
        MonitoredEntity::Sector {
            mine_id: mine_id.into(),
            sector_id: sector_id.into(),
        }
    }

    pub fn sensor(
        mine_id: impl Into<String>,
        sector_id: impl Into<String>,
        sensor_id: impl Into<String>,
    ) -> Self {
        MonitoredEntity::Sensor {
            mine_id: mine_id.into(),
            sector_id: sector_id.into(),
            sensor_id: sensor_id.into(),
        }
    }

    /// 稳定实体键。
    pub fn key(&self) -> String {
        match self {
            MonitoredEntity::Mine { mine_id } => format!("mine:{}", mine_id),
            MonitoredEntity::Sector { mine_id, sector_id } => {
                format!("sector:{}:{}", mine_id, sector_id)
            }
            MonitoredEntity::Sensor {
                mine_id,
                sector_id,
                sensor_id,
            } => format!("sensor:{}:{}:{}", mine_id, sector_id, sensor_id),
        }
    }

    pub fn mine_id(&self) -> &str {
        match self {
            MonitoredEntity::Mine { mine_id } => mine_id,
            MonitoredEntity::Sector { mine_id, .. } => mine_id,
            MonitoredEntity::Sensor { mine_id, .. } => mine_id,
        }
    }

    pub fn sector_id(&self) -> Option<&str> {
        match self {
            MonitoredEntity::Mine { .. } => None,
            MonitoredEntity::Sector { sector_id, .. } => Some(sector_id),
            MonitoredEntity::Sensor { sector_id, .. } => Some(sector_id),
        }
    }

    pub fn sensor_id(&self) -> Option<&str> {
        match self {
            MonitoredEntity::Sensor { sensor_id, .. } => Some(sensor_id),
            _ => None,
        }
    }
}
