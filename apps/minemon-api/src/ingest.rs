//! 采集链路装配模块
//!
//! 将数据采集的各个组件（数据源、标定器、监测服务、存储层）组装在一起，
//! 构建完整的读数处理链路：原始读数经标定后进入阈值评估、实时存储、
//! 状态聚合与告警生成。真实网关（MQTT）与模拟数据源走同一条链路。

use crate::AppState;
use minemon_config::AppConfig;
use minemon_ingest::{
    IngestError, MqttSource, MqttSourceConfig, ReadingHandler, SimulatedSource,
    SimulatedSourceConfig, Source,
};
use minemon_monitoring::MonitoringService;
use minemon_normalize::{CalibrationOutcome, Calibrator, StorageSensorProfileProvider};
use minemon_telemetry::{
    record_alert_deduplicated, record_alert_raised, record_alert_suppressed_debounce,
    record_end_to_end_latency_ms, record_evaluate_latency_ms, record_reading_dropped_inactive,
    record_reading_dropped_invalid, record_reading_dropped_unmapped, record_reading_evaluated,
    record_reading_received, record_realtime_write_failure, record_realtime_write_success,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// 读数处理器：标定 → 监测链路。
struct MonitorHandler {
    calibrator: Calibrator,
    monitoring: Arc<MonitoringService>,
}

#[async_trait::async_trait]
impl ReadingHandler for MonitorHandler {
    async fn handle(&self, reading: domain::RawReading) -> Result<(), IngestError> {
        record_reading_received();
        info!(
            target: "minemon.ingest",
            mine_id = %reading.mine_id,
            sector_id = %reading.sector_id,
            sensor_id = %reading.sensor_id,
            payload_size = reading.payload.len(),
            received_at_ms = reading.received_at_ms,
            "raw_reading_received"
        );

        let received_at_ms = reading.received_at_ms;
        let outcome = match self.calibrator.calibrate(reading).await {
            Ok(outcome) => outcome,
            Err(err) => {
                record_reading_dropped_invalid();
                warn!(target: "minemon.ingest", error = %err, "calibration_failed");
                return Ok(());
            }
        };

        let (reading, location) = match outcome {
            CalibrationOutcome::Calibrated { reading, location } => (reading, location),
            CalibrationOutcome::UnknownSensor => {
                record_reading_dropped_unmapped();
                info!(target: "minemon.ingest", "calibration_skipped_unknown_sensor");
                return Ok(());
            }
            CalibrationOutcome::InactiveSensor => {
                record_reading_dropped_inactive();
                return Ok(());
            }
        };

        let ctx = domain::AuthContext::system();
        let started_at = Instant::now();
        match self.monitoring.process(&ctx, &reading, &location).await {
            Ok(report) => {
                record_reading_evaluated();
                record_realtime_write_success();
                record_evaluate_latency_ms(started_at.elapsed().as_millis() as u64);
                let end_to_end = now_epoch_ms() - received_at_ms;
                if end_to_end >= 0 {
                    record_end_to_end_latency_ms(end_to_end as u64);
                }
                for _ in 0..report.suppressed {
                    record_alert_suppressed_debounce();
                }
                for _ in 0..report.deduplicated {
                    record_alert_deduplicated();
                }
                for alert in &report.raised {
                    record_alert_raised();
                    info!(
                        target: "minemon.monitoring",
                        alert_id = %alert.alert_id,
                        severity = %alert.severity,
                        mine_id = %alert.mine_id,
                        entity_key = %alert.entity_key,
                        message = %alert.message,
                        "alert_raised"
                    );
                }
            }
            Err(err) => {
                record_realtime_write_failure();
                warn!(target: "minemon.monitoring", error = %err, "reading_processing_failed");
            }
        }
        Ok(())
    }
}

/// 按配置启动采集源。
pub fn spawn_sources(config: &AppConfig, state: &AppState) {
    if !config.ingest_enabled && !config.simulate_enabled {
        return;
    }

    let provider = Arc::new(StorageSensorProfileProvider::new(state.sensor_store.clone()));
    let handler: Arc<dyn ReadingHandler> = Arc::new(MonitorHandler {
        calibrator: Calibrator::new(provider),
        monitoring: state.monitoring.clone(),
    });

    if config.ingest_enabled {
        let source = MqttSource::new(MqttSourceConfig {
            host: config.mqtt_host.clone(),
            port: config.mqtt_port,
            username: config.mqtt_username.clone(),
            password: config.mqtt_password.clone(),
            topic_prefix: config.mqtt_readings_topic_prefix.clone(),
        });
        let handler = handler.clone();
        tokio::spawn(async move {
            if let Err(err) = source.run(handler).await {
                warn!(target: "minemon.ingest", error = %err, "mqtt_source_stopped");
            }
        });
    }

    if config.simulate_enabled {
        let source = SimulatedSource::new(
            state.mine_store.clone(),
            state.sensor_store.clone(),
            SimulatedSourceConfig {
                interval_ms: config.simulate_interval_ms,
                ..SimulatedSourceConfig::default()
            },
        );
        tokio::spawn(async move {
            if let Err(err) = source.run(handler).await {
                warn!(target: "minemon.ingest", error = %err, "simulated_source_stopped");
            }
        });
    }
}

fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
