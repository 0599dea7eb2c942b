//! 读数处理服务：标定读数进入后的完整监测链路。
//!
//! 每条读数依次：
//! 1. 阈值评估得到传感器分层
//! 2. 写入实时存储（覆盖该传感器的最新读数）
//! 3. 聚合分区与矿井分层（最差值）
//! 4. 在传感器、分区、矿井三个层级上观察转换并生成告警

use crate::alert::{AlertDecision, AlertGenerator};
use crate::aggregate::aggregate_reading_tiers;
use crate::threshold::ThresholdTable;
use crate::MonitorError;
use domain::{AuthContext, CalibratedReading, MonitoredEntity, StatusTier};
use minemon_storage::{AlertRecord, RealtimeStore, SensorReadingRecord};
use std::sync::Arc;

/// 一条读数走完链路后的汇总。
#[derive(Debug, Default)]
pub struct ProcessReport {
    /// 传感器自身的评估分层。
    pub tier: Option<StatusTier>,
    /// 本次新产生的告警。
    pub raised: Vec<AlertRecord>,
    /// 命中去抖窗口的次数。
    pub suppressed: u64,
    /// 插入竞态落败次数。
    pub deduplicated: u64,
}

impl ProcessReport {
    fn absorb(&mut self, decision: AlertDecision) {
        if let Some(record) = decision.raised {
            self.raised.push(record);
        }
        if decision.suppressed {
            self.suppressed += 1;
        }
        if decision.deduplicated {
            self.deduplicated += 1;
        }
    }
}

/// 监测服务：阈值表 + 实时存储 + 告警生成器。
pub struct MonitoringService {
    thresholds: ThresholdTable,
    realtime: Arc<dyn RealtimeStore>,
    generator: AlertGenerator,
}

impl MonitoringService {
    pub fn new(
        thresholds: ThresholdTable,
        realtime: Arc<dyn RealtimeStore>,
        generator: AlertGenerator,
    ) -> Self {
        Self {
            thresholds,
            realtime,
            generator,
        }
    }

    pub fn generator(&self) -> &AlertGenerator {
        &self.generator
    }

    /// 处理一条标定读数。
    ///
    /// location 为传感器的物理位置描述，用于告警文案。
    pub async fn process(
        &self,
        ctx: &AuthContext,
        reading: &CalibratedReading,
        location: &str,
    ) -> Result<ProcessReport, MonitorError> {
        let tier = self
            .thresholds
            .evaluate(reading.sensor_type, reading.value)?;

        self.realtime
            .upsert_reading(
                ctx,
                &SensorReadingRecord {
                    mine_id: reading.mine_id.clone(),
                    sector_id: reading.sector_id.clone(),
                    sensor_id: reading.sensor_id.clone(),
                    sensor_type: reading.sensor_type.as_str().to_string(),
                    value: reading.value,
                    tier: tier.as_str().to_string(),
                    ts_ms: reading.ts_ms,
                },
            )
            .await?;

        let mut report = ProcessReport {
            tier: Some(tier),
            ..ProcessReport::default()
        };

        let sensor_entity = MonitoredEntity::sensor(
            reading.mine_id.clone(),
            reading.sector_id.clone(),
            reading.sensor_id.clone(),
        );
        let sensor_message = format!(
            "{} reading {:.1} {} reached {} at {}",
            reading.sensor_type.as_str(),
            reading.value,
            reading.sensor_type.unit(),
            tier.as_str(),
            location
        );
        let decision = self
            .generator
            .observe(ctx, &sensor_entity, tier, location, &sensor_message, reading.ts_ms)
            .await?;
        report.absorb(decision);

        // 分区聚合
        let sector_readings = self
            .realtime
            .list_sector_readings(ctx, &reading.mine_id, &reading.sector_id)
            .await?;
        let sector_tier = aggregate_reading_tiers(&sector_readings);
        let sector_entity =
            MonitoredEntity::sector(reading.mine_id.clone(), reading.sector_id.clone());
        let sector_message = format!(
            "sector {} of mine {} escalated to {}",
            reading.sector_id,
            reading.mine_id,
            sector_tier.as_str()
        );
        let decision = self
            .generator
            .observe(
                ctx,
                &sector_entity,
                sector_tier,
                location,
                &sector_message,
                reading.ts_ms,
            )
            .await?;
        report.absorb(decision);

        // 矿井聚合
        let mine_readings = self
            .realtime
            .list_mine_readings(ctx, &reading.mine_id)
            .await?;
        let mine_tier = aggregate_reading_tiers(&mine_readings);
        let mine_entity = MonitoredEntity::mine(reading.mine_id.clone());
        let mine_message = format!(
            "mine {} escalated to {}",
            reading.mine_id,
            mine_tier.as_str()
        );
        let decision = self
            .generator
            .observe(
                ctx,
                &mine_entity,
                mine_tier,
                location,
                &mine_message,
                reading.ts_ms,
            )
            .await?;
        report.absorb(decision);

        Ok(report)
    }
}
