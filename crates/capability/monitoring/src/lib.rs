//! 监测能力：阈值评估、状态聚合、告警生成。
//!
//! 数据流：标定读数 → 阈值评估（分层）→ 实时存储 → 分区/矿井聚合
//! → 告警生成（仅上行转换，带去抖）。
//!
//! 评估与聚合是纯函数；告警生成是唯一的读改写环节，
//! 在生成器内部串行化，存储层唯一约束兜底并发竞态。

pub mod aggregate;
pub mod alert;
pub mod service;
pub mod threshold;

pub use aggregate::{aggregate, aggregate_reading_tiers};
pub use alert::{AlertDecision, AlertGenerator, AlertPolicy};
pub use service::{MonitoringService, ProcessReport};
pub use threshold::{ThresholdBounds, ThresholdError, ThresholdTable};

/// 监测链路错误。
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error(transparent)]
    Threshold(#[from] ThresholdError),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<minemon_storage::StorageError> for MonitorError {
    fn from(err: minemon_storage::StorageError) -> Self {
        MonitorError::Storage(err.to_string())
    }
}
