use domain::{AuthContext, CalibratedReading, SensorType, StatusTier};
use minemon_monitoring::{AlertGenerator, AlertPolicy, MonitoringService, ThresholdTable};
use minemon_storage::{AlertFilter, AlertStore, InMemoryAlertStore, InMemoryRealtimeStore, RealtimeStore};
use std::sync::Arc;

fn service(
    alerts: &Arc<InMemoryAlertStore>,
    realtime: &Arc<InMemoryRealtimeStore>,
) -> MonitoringService {
    MonitoringService::new(
        ThresholdTable::defaults(),
        realtime.clone(),
        AlertGenerator::new(alerts.clone(), AlertPolicy { debounce_ms: 60_000 }),
    )
}

fn reading(sensor_id: &str, sensor_type: SensorType, value: f64, ts_ms: i64) -> CalibratedReading {
    CalibratedReading {
        mine_id: "mine-1".to_string(),
        sector_id: "sector-a".to_string(),
        sensor_id: sensor_id.to_string(),
        sensor_type,
        value,
        ts_ms,
    }
}

#[tokio::test]
async fn critical_reading_escalates_sensor_sector_and_mine() {
    let alerts = Arc::new(InMemoryAlertStore::new());
    let realtime = Arc::new(InMemoryRealtimeStore::new());
    let service = service(&alerts, &realtime);
    let ctx = AuthContext::system();

    let report = service
        .process(&ctx, &reading("sensor-1", SensorType::Gas, 150.0, 1_000), "north gallery")
        .await
        .expect("process");

    assert_eq!(report.tier, Some(StatusTier::Critical));
    // 传感器、分区、矿井各一条
    assert_eq!(report.raised.len(), 3);

    let latest = realtime
        .get_reading(&ctx, "mine-1", "sector-a", "sensor-1")
        .await
        .expect("query")
        .expect("reading");
    assert_eq!(latest.tier, "critical");

    let stored = alerts
        .list_alerts(&ctx, AlertFilter::default())
        .await
        .expect("list");
    assert!(stored.iter().any(|alert| alert.sensor_id.is_some()));
    assert!(stored
        .iter()
        .any(|alert| alert.sector_id.is_some() && alert.sensor_id.is_none()));
    assert!(stored
        .iter()
        .any(|alert| alert.sector_id.is_none() && alert.sensor_id.is_none()));
}

#[tokio::test]
async fn healthy_second_sensor_does_not_lower_the_sector() {
    let alerts = Arc::new(InMemoryAlertStore::new());
    let realtime = Arc::new(InMemoryRealtimeStore::new());
    let service = service(&alerts, &realtime);
    let ctx = AuthContext::system();

    service
        .process(&ctx, &reading("sensor-1", SensorType::Gas, 150.0, 1_000), "north gallery")
        .await
        .expect("process");
    let before = alerts.len();

    // 同分区的正常读数：最差值聚合保持 critical，不应产生新告警
    let report = service
        .process(&ctx, &reading("sensor-2", SensorType::Temperature, 20.0, 2_000), "south gallery")
        .await
        .expect("process");
    assert_eq!(report.tier, Some(StatusTier::Normal));
    assert!(report.raised.is_empty());
    assert_eq!(alerts.len(), before);
}

#[tokio::test]
async fn unknown_threshold_entry_surfaces_as_error() {
    let alerts = Arc::new(InMemoryAlertStore::new());
    let realtime = Arc::new(InMemoryRealtimeStore::new());
    let table = ThresholdTable::new([(
        SensorType::Gas,
        minemon_monitoring::ThresholdBounds {
            warning: 50.0,
            critical: 100.0,
        },
    )])
    .expect("table");
    let service = MonitoringService::new(
        table,
        realtime.clone(),
        AlertGenerator::new(alerts.clone(), AlertPolicy::default()),
    );
    let ctx = AuthContext::system();

    let err = service
        .process(&ctx, &reading("sensor-1", SensorType::Seismic, 3.0, 1_000), "shaft")
        .await
        .expect_err("unknown type");
    assert!(matches!(
        err,
        minemon_monitoring::MonitorError::Threshold(
            minemon_monitoring::ThresholdError::UnknownSensorType(_)
        )
    ));
    // 评估失败的读数不进入实时存储
    assert!(realtime.is_empty());
}
