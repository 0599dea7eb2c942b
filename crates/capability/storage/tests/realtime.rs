use domain::AuthContext;
use minemon_storage::{InMemoryRealtimeStore, RealtimeStore, SensorReadingRecord};

fn reading(sector_id: &str, sensor_id: &str, value: f64, tier: &str) -> SensorReadingRecord {
    SensorReadingRecord {
        mine_id: "mine-1".to_string(),
        sector_id: sector_id.to_string(),
        sensor_id: sensor_id.to_string(),
        sensor_type: "gas".to_string(),
        value,
        tier: tier.to_string(),
        ts_ms: 1000,
    }
}

#[tokio::test]
async fn upsert_keeps_latest_reading_only() {
    let store = InMemoryRealtimeStore::new();
    let ctx = AuthContext::system();

    store
        .upsert_reading(&ctx, &reading("sector-a", "sensor-1", 10.0, "normal"))
        .await
        .expect("write");
    store
        .upsert_reading(&ctx, &reading("sector-a", "sensor-1", 80.0, "warning"))
        .await
        .expect("write");

    assert_eq!(store.len(), 1);
    let latest = store
        .get_reading(&ctx, "mine-1", "sector-a", "sensor-1")
        .await
        .expect("query")
        .expect("reading");
    assert_eq!(latest.value, 80.0);
    assert_eq!(latest.tier, "warning");
}

#[tokio::test]
async fn sector_and_mine_listings_scope_correctly() {
    let store = InMemoryRealtimeStore::new();
    let ctx = AuthContext::system();

    store
        .upsert_reading(&ctx, &reading("sector-a", "sensor-1", 10.0, "normal"))
        .await
        .expect("write");
    store
        .upsert_reading(&ctx, &reading("sector-b", "sensor-2", 90.0, "critical"))
        .await
        .expect("write");

    let sector_a = store
        .list_sector_readings(&ctx, "mine-1", "sector-a")
        .await
        .expect("list");
    assert_eq!(sector_a.len(), 1);

    let mine = store
        .list_mine_readings(&ctx, "mine-1")
        .await
        .expect("list");
    assert_eq!(mine.len(), 2);

    let other = store
        .list_mine_readings(&ctx, "mine-2")
        .await
        .expect("list");
    assert!(other.is_empty());
}
