//! 告警生成：状态转换 → 告警记录。
//!
//! 规则：
//! - 仅上行转换（new > previous）产生告警；下行只更新基线
//! - 去抖：同一 (实体, 严重级) 在一个窗口内不产生第二条未确认告警
//! - 检查后插入在生成器互斥锁内串行化；越过检查的并发竞态由存储层
//!   (entity_key, severity, debounce_slot) 唯一约束兜底，落败方按成功空操作处理
//! - 确认是独立操作且幂等，不影响基线

use crate::MonitorError;
use domain::{AlertSeverity, AuthContext, MonitoredEntity, StatusTier};
use minemon_storage::{AlertRecord, AlertStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// 告警生成参数。
#[derive(Debug, Clone)]
pub struct AlertPolicy {
    /// 去抖窗口（毫秒）；最小一个读数间隔。
    pub debounce_ms: i64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self { debounce_ms: 60_000 }
    }
}

impl AlertPolicy {
    fn sanitized(mut self) -> Self {
        if self.debounce_ms <= 0 {
            self.debounce_ms = 1;
        }
        self
    }
}

/// 单次观察的结果。
#[derive(Debug, Clone, Default)]
pub struct AlertDecision {
    /// 新产生的告警（仅上行转换且未被去抖/去重时）。
    pub raised: Option<AlertRecord>,
    /// 命中去抖窗口而未生成。
    pub suppressed: bool,
    /// 插入竞态落败（存储层唯一约束），按成功空操作处理。
    pub deduplicated: bool,
}

/// 告警生成器：维护各实体的上一分层基线。
pub struct AlertGenerator {
    alerts: Arc<dyn AlertStore>,
    policy: AlertPolicy,
    baselines: Mutex<HashMap<String, StatusTier>>,
}

impl AlertGenerator {
    pub fn new(alerts: Arc<dyn AlertStore>, policy: AlertPolicy) -> Self {
        Self {
            alerts,
            policy: policy.sanitized(),
            baselines: Mutex::new(HashMap::new()),
        }
    }

    /// 观察一个实体的最新分层，必要时生成告警。
    ///
    /// 基线更新与检查后插入都在同一把锁内完成，
    /// 同一生成器上的并发观察不会产生重复告警。
    pub async fn observe(
        &self,
        ctx: &AuthContext,
        entity: &MonitoredEntity,
        new_tier: StatusTier,
        location: &str,
        message: &str,
        now_ms: i64,
    ) -> Result<AlertDecision, MonitorError> {
        let entity_key = entity.key();
        let mut baselines = self.baselines.lock().await;
        let previous = baselines
            .get(&entity_key)
            .copied()
            .unwrap_or(StatusTier::Normal);
        baselines.insert(entity_key.clone(), new_tier);

        if new_tier <= previous {
            return Ok(AlertDecision::default());
        }
        let Some(severity) = AlertSeverity::from_tier(new_tier) else {
            return Ok(AlertDecision::default());
        };

        let window_start = now_ms.saturating_sub(self.policy.debounce_ms);
        let recent = self
            .alerts
            .find_recent_open(ctx, &entity_key, severity.as_str(), window_start)
            .await?;
        if recent.is_some() {
            return Ok(AlertDecision {
                suppressed: true,
                ..AlertDecision::default()
            });
        }

        let record = AlertRecord {
            alert_id: Uuid::new_v4().to_string(),
            entity_key,
            severity: severity.as_str().to_string(),
            debounce_slot: now_ms / self.policy.debounce_ms,
            message: message.to_string(),
            location: location.to_string(),
            mine_id: entity.mine_id().to_string(),
            sector_id: entity.sector_id().map(str::to_string),
            sensor_id: entity.sensor_id().map(str::to_string),
            raised_at_ms: now_ms,
            acknowledged: false,
            acknowledged_by: None,
            acknowledged_at_ms: None,
        };
        match self.alerts.insert_alert(ctx, record).await {
            Ok(record) => Ok(AlertDecision {
                raised: Some(record),
                ..AlertDecision::default()
            }),
            Err(minemon_storage::StorageError::DuplicateOpenAlert) => Ok(AlertDecision {
                deduplicated: true,
                ..AlertDecision::default()
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// 确认告警（幂等；确认不影响基线）。
    pub async fn acknowledge(
        &self,
        ctx: &AuthContext,
        alert_id: &str,
        acknowledged_by: &str,
        now_ms: i64,
    ) -> Result<Option<AlertRecord>, MonitorError> {
        Ok(self
            .alerts
            .acknowledge_alert(ctx, alert_id, acknowledged_by, now_ms)
            .await?)
    }
}
