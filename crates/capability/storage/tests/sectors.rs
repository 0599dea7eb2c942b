use domain::AuthContext;
use minemon_storage::{InMemorySectorStore, SectorRecord, SectorStore, SectorUpdate, StorageError};

fn sector(mine_id: &str, sector_id: &str, level: i32) -> SectorRecord {
    SectorRecord {
        sector_id: sector_id.to_string(),
        mine_id: mine_id.to_string(),
        name: format!("Level {level}"),
        level,
        status: "active".to_string(),
    }
}

#[tokio::test]
async fn duplicate_level_in_same_mine_is_rejected() {
    let store = InMemorySectorStore::new();
    let ctx = AuthContext::new("user-1", "admin", None);

    store
        .create_sector(&ctx, sector("mine-1", "sector-a", 2))
        .await
        .expect("create");
    let err = store
        .create_sector(&ctx, sector("mine-1", "sector-b", 2))
        .await
        .expect_err("collision");
    assert!(matches!(err, StorageError::DuplicateSectorLevel));
}

#[tokio::test]
async fn same_level_in_another_mine_is_fine() {
    let store = InMemorySectorStore::new();
    let ctx = AuthContext::new("user-1", "admin", None);

    store
        .create_sector(&ctx, sector("mine-1", "sector-a", 2))
        .await
        .expect("create");
    store
        .create_sector(&ctx, sector("mine-2", "sector-a", 2))
        .await
        .expect("other mine same level");
}

#[tokio::test]
async fn level_update_checks_siblings() {
    let store = InMemorySectorStore::new();
    let ctx = AuthContext::new("user-1", "admin", None);

    store
        .create_sector(&ctx, sector("mine-1", "sector-a", 1))
        .await
        .expect("create");
    store
        .create_sector(&ctx, sector("mine-1", "sector-b", 2))
        .await
        .expect("create");

    let err = store
        .update_sector(
            &ctx,
            "mine-1",
            "sector-b",
            SectorUpdate {
                name: None,
                level: Some(1),
                status: None,
            },
        )
        .await
        .expect_err("collision");
    assert!(matches!(err, StorageError::DuplicateSectorLevel));

    // 改回自己当前的层级不算冲突
    let updated = store
        .update_sector(
            &ctx,
            "mine-1",
            "sector-b",
            SectorUpdate {
                name: None,
                level: Some(2),
                status: None,
            },
        )
        .await
        .expect("update")
        .expect("sector");
    assert_eq!(updated.level, 2);
}
