//! 状态聚合：取最差分层。
//!
//! 聚合必须满足结合律且与顺序无关，才能保证增量聚合
//! 与一次性聚合得到同一结果；空输入按"无数据不报警"取 Normal。

use domain::StatusTier;
use minemon_storage::SensorReadingRecord;

/// 一组状态分层的最差值；空序列为 Normal。
pub fn aggregate<I>(statuses: I) -> StatusTier
where
    I: IntoIterator<Item = StatusTier>,
{
    statuses
        .into_iter()
        .fold(StatusTier::Normal, StatusTier::max)
}

/// 对实时读数记录聚合；无法解析的分层编码按 Normal 计入。
pub fn aggregate_reading_tiers(readings: &[SensorReadingRecord]) -> StatusTier {
    aggregate(
        readings
            .iter()
            .map(|reading| StatusTier::parse(&reading.tier).unwrap_or_default()),
    )
}
