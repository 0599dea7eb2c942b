use domain::AuthContext;
use minemon_storage::{AlertFilter, AlertRecord, AlertStore, InMemoryAlertStore, StorageError};

fn alert(alert_id: &str, entity_key: &str, severity: &str, raised_at_ms: i64) -> AlertRecord {
    AlertRecord {
        alert_id: alert_id.to_string(),
        entity_key: entity_key.to_string(),
        severity: severity.to_string(),
        debounce_slot: raised_at_ms / 60_000,
        message: "gas level warning".to_string(),
        location: "north gallery".to_string(),
        mine_id: "mine-1".to_string(),
        sector_id: Some("sector-a".to_string()),
        sensor_id: Some("sensor-1".to_string()),
        raised_at_ms,
        acknowledged: false,
        acknowledged_by: None,
        acknowledged_at_ms: None,
    }
}

#[tokio::test]
async fn open_alert_is_unique_per_entity_and_severity() {
    let store = InMemoryAlertStore::new();
    let ctx = AuthContext::new("system", "system", None);

    store
        .insert_alert(&ctx, alert("a1", "sensor:mine-1:sector-a:sensor-1", "warning", 1000))
        .await
        .expect("insert");
    let err = store
        .insert_alert(&ctx, alert("a2", "sensor:mine-1:sector-a:sensor-1", "warning", 2000))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, StorageError::DuplicateOpenAlert));

    // 不同严重级不受约束
    store
        .insert_alert(&ctx, alert("a3", "sensor:mine-1:sector-a:sensor-1", "critical", 2000))
        .await
        .expect("other severity");
}

#[tokio::test]
async fn acknowledge_is_idempotent() {
    let store = InMemoryAlertStore::new();
    let ctx = AuthContext::new("user-1", "foreman", None);

    store
        .insert_alert(&ctx, alert("a1", "mine:mine-1", "critical", 1000))
        .await
        .expect("insert");

    let first = store
        .acknowledge_alert(&ctx, "a1", "user-1", 5000)
        .await
        .expect("ack")
        .expect("alert");
    assert!(first.acknowledged);
    assert_eq!(first.acknowledged_at_ms, Some(5000));

    let second = store
        .acknowledge_alert(&ctx, "a1", "user-2", 9000)
        .await
        .expect("ack")
        .expect("alert");
    // 重复确认保留首次确认信息
    assert_eq!(second.acknowledged_by.as_deref(), Some("user-1"));
    assert_eq!(second.acknowledged_at_ms, Some(5000));
}

#[tokio::test]
async fn acknowledged_alert_frees_the_open_slot() {
    let store = InMemoryAlertStore::new();
    let ctx = AuthContext::new("user-1", "foreman", None);

    store
        .insert_alert(&ctx, alert("a1", "sector:mine-1:sector-a", "warning", 1000))
        .await
        .expect("insert");
    store
        .acknowledge_alert(&ctx, "a1", "user-1", 2000)
        .await
        .expect("ack");
    store
        .insert_alert(&ctx, alert("a2", "sector:mine-1:sector-a", "warning", 3000))
        .await
        .expect("fresh alert after ack");
}

#[tokio::test]
async fn recent_open_lookup_honours_window_start() {
    let store = InMemoryAlertStore::new();
    let ctx = AuthContext::new("system", "system", None);

    store
        .insert_alert(&ctx, alert("a1", "mine:mine-1", "warning", 1000))
        .await
        .expect("insert");

    let hit = store
        .find_recent_open(&ctx, "mine:mine-1", "warning", 500)
        .await
        .expect("query");
    assert!(hit.is_some());

    let miss = store
        .find_recent_open(&ctx, "mine:mine-1", "warning", 1500)
        .await
        .expect("query");
    assert!(miss.is_none());
}

#[tokio::test]
async fn list_alerts_filters_and_orders() {
    let store = InMemoryAlertStore::new();
    let ctx = AuthContext::new("system", "system", None);

    store
        .insert_alert(&ctx, alert("a1", "mine:mine-1", "warning", 1000))
        .await
        .expect("insert");
    let mut other = alert("a2", "mine:mine-2", "critical", 2000);
    other.mine_id = "mine-2".to_string();
    store.insert_alert(&ctx, other).await.expect("insert");

    let all = store
        .list_alerts(&ctx, AlertFilter::default())
        .await
        .expect("list");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].alert_id, "a2");

    let mine_1 = store
        .list_alerts(
            &ctx,
            AlertFilter {
                mine_id: Some("mine-1".to_string()),
                ..AlertFilter::default()
            },
        )
        .await
        .expect("list");
    assert_eq!(mine_1.len(), 1);
    assert_eq!(mine_1[0].alert_id, "a1");
}
