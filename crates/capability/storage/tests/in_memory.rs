use domain::AuthContext;
use minemon_storage::{InMemoryUserStore, RbacStore, UserStore};

#[tokio::test]
async fn find_default_admin() {
    let store = InMemoryUserStore::with_default_admin();
    let ctx = AuthContext::default();
    let user = store
        .find_by_email(&ctx, "admin@minemon.local")
        .await
        .expect("query")
        .expect("admin");
    assert_eq!(user.username, "admin");
    assert_eq!(user.role_code.as_deref(), Some("admin"));
}

#[tokio::test]
async fn admin_role_holds_every_global_permission() {
    let store = InMemoryUserStore::with_default_admin();
    let ctx = AuthContext::default();
    let role = store
        .find_role(&ctx, "admin")
        .await
        .expect("query")
        .expect("role");
    for code in domain::permissions::GLOBAL_PERMISSION_CODES {
        assert!(role.permissions.iter().any(|p| p == code), "missing {code}");
    }
}

#[tokio::test]
async fn role_permission_replacement_is_whole_set() {
    let store = InMemoryUserStore::with_default_admin();
    let ctx = AuthContext::new("user-1", "admin", None);
    let updated = store
        .set_role_permissions(
            &ctx,
            "admin",
            vec!["view_alerts".to_string(), "view_reports".to_string()],
        )
        .await
        .expect("update")
        .expect("role");
    assert_eq!(updated.permissions.len(), 2);

    let reread = store
        .find_role(&ctx, "admin")
        .await
        .expect("query")
        .expect("role");
    assert_eq!(reread.permissions, updated.permissions);
}

#[tokio::test]
async fn sector_access_grants_are_unique_per_pair() {
    let store = InMemoryUserStore::with_default_admin();
    let ctx = AuthContext::new("user-1", "admin", None);
    let grant = minemon_storage::SectorAccessRecord {
        user_id: "user-1".to_string(),
        mine_id: "mine-1".to_string(),
        sector_id: "sector-a".to_string(),
        permissions: vec!["view_sector".to_string()],
    };
    store
        .grant_sector_access(&ctx, grant.clone())
        .await
        .expect("grant");
    // 同一 (user, mine, sector) 再次授予是整体替换而不是追加
    store
        .grant_sector_access(
            &ctx,
            minemon_storage::SectorAccessRecord {
                permissions: vec!["view_sector_sensors".to_string()],
                ..grant
            },
        )
        .await
        .expect("grant");
    let entries = store
        .list_sector_access(&ctx, "user-1")
        .await
        .expect("list");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].permissions, vec!["view_sector_sensors"]);
}

#[tokio::test]
async fn deleting_role_clears_holder_references() {
    let store = InMemoryUserStore::with_default_admin();
    let ctx = AuthContext::new("user-1", "admin", None);
    store
        .create_role(
            &ctx,
            minemon_storage::RoleCreate {
                role_code: "miner".to_string(),
                name: "Miner".to_string(),
                permissions: vec!["view_alerts".to_string()],
            },
        )
        .await
        .expect("create role");
    store
        .create_user(
            &ctx,
            minemon_storage::RbacUserCreate {
                user_id: "user-2".to_string(),
                username: "miner-1".to_string(),
                email: "miner-1@minemon.local".to_string(),
                password: "hash".to_string(),
                status: "active".to_string(),
                role_code: Some("miner".to_string()),
            },
        )
        .await
        .expect("create user");

    assert!(store.delete_role(&ctx, "miner").await.expect("delete"));
    let user = store
        .find_user(&ctx, "user-2")
        .await
        .expect("query")
        .expect("user");
    assert!(user.role_code.is_none());
}
