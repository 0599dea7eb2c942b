use domain::permissions::{self, Scope};
use domain::AuthContext;
use minemon_access::AccessControl;
use minemon_storage::{
    InMemoryUserStore, RbacStore, RbacUserCreate, RoleCreate, SectorAccessRecord,
};
use std::sync::Arc;

async fn store_with_miner() -> Arc<InMemoryUserStore> {
    let store = Arc::new(InMemoryUserStore::with_default_admin());
    let ctx = AuthContext::new("user-1", "admin", None);
    store
        .create_role(
            &ctx,
            RoleCreate {
                role_code: "miner".to_string(),
                name: "Miner".to_string(),
                permissions: vec![permissions::VIEW_ALERTS.to_string()],
            },
        )
        .await
        .expect("role");
    store
        .create_user(
            &ctx,
            RbacUserCreate {
                user_id: "user-2".to_string(),
                username: "miner-1".to_string(),
                email: "miner-1@minemon.local".to_string(),
                password: "hash".to_string(),
                status: "active".to_string(),
                role_code: Some("miner".to_string()),
            },
        )
        .await
        .expect("user");
    store
        .create_user(
            &ctx,
            RbacUserCreate {
                user_id: "user-3".to_string(),
                username: "roleless".to_string(),
                email: "roleless@minemon.local".to_string(),
                password: "hash".to_string(),
                status: "active".to_string(),
                role_code: None,
            },
        )
        .await
        .expect("user");
    store
}

fn access(store: &Arc<InMemoryUserStore>) -> AccessControl {
    AccessControl::new(store.clone(), store.clone())
}

#[tokio::test]
async fn no_role_means_empty_global_set() {
    let store = store_with_miner().await;
    let access = access(&store);
    let ctx = AuthContext::new("user-3", "roleless", None);

    let effective = access
        .effective_permissions(&ctx, "user-3", &Scope::Global)
        .await
        .expect("derive");
    assert!(effective.is_empty());
}

#[tokio::test]
async fn missing_user_means_empty_set_not_error() {
    let store = store_with_miner().await;
    let access = access(&store);
    let ctx = AuthContext::new("ghost", "ghost", None);

    let effective = access
        .effective_permissions(&ctx, "ghost", &Scope::Global)
        .await
        .expect("derive");
    assert!(effective.is_empty());
}

#[tokio::test]
async fn global_scope_returns_role_set() {
    let store = store_with_miner().await;
    let access = access(&store);
    let ctx = AuthContext::new("user-2", "miner-1", None);

    let effective = access
        .effective_permissions(&ctx, "user-2", &Scope::Global)
        .await
        .expect("derive");
    assert!(effective.contains(permissions::VIEW_ALERTS));
    assert_eq!(effective.len(), 1);
}

#[tokio::test]
async fn sector_scope_unions_implied_and_override() {
    let store = store_with_miner().await;
    let access = access(&store);
    let ctx = AuthContext::new("user-2", "miner-1", None);

    store
        .grant_sector_access(
            &ctx,
            SectorAccessRecord {
                user_id: "user-2".to_string(),
                mine_id: "mine-1".to_string(),
                sector_id: "sector-a".to_string(),
                permissions: vec![permissions::VIEW_SECTOR_SENSORS.to_string()],
            },
        )
        .await
        .expect("grant");

    let effective = access
        .effective_permissions(&ctx, "user-2", &Scope::sector("mine-1", "sector-a"))
        .await
        .expect("derive");
    // view_alerts 隐含 view_sector_alerts，覆盖集补充 view_sector_sensors
    assert!(effective.contains(permissions::VIEW_SECTOR_ALERTS));
    assert!(effective.contains(permissions::VIEW_SECTOR_SENSORS));
    assert!(!effective.contains(permissions::MANAGE_SECTOR_SENSORS));

    // 其他分区不受该覆盖影响
    let other = access
        .effective_permissions(&ctx, "user-2", &Scope::sector("mine-1", "sector-b"))
        .await
        .expect("derive");
    assert!(!other.contains(permissions::VIEW_SECTOR_SENSORS));
}

#[tokio::test]
async fn role_permission_update_is_visible_immediately() {
    let store = store_with_miner().await;
    let access = access(&store);
    let admin_ctx = AuthContext::new("user-1", "admin", None);
    let ctx = AuthContext::new("user-2", "miner-1", None);

    access
        .update_role_permissions(
            &admin_ctx,
            "miner",
            vec![
                permissions::VIEW_ALERTS.to_string(),
                permissions::VIEW_REPORTS.to_string(),
            ],
        )
        .await
        .expect("update")
        .expect("role");

    let effective = access
        .effective_permissions(&ctx, "user-2", &Scope::Global)
        .await
        .expect("derive");
    assert!(effective.contains(permissions::VIEW_REPORTS));
}

#[tokio::test]
async fn role_update_rejects_sector_namespace_codes() {
    let store = store_with_miner().await;
    let access = access(&store);
    let admin_ctx = AuthContext::new("user-1", "admin", None);

    let err = access
        .update_role_permissions(
            &admin_ctx,
            "miner",
            vec![permissions::VIEW_SECTOR.to_string()],
        )
        .await
        .expect_err("namespace violation");
    assert!(matches!(err, minemon_access::AccessError::UnknownPermission(_)));
}

#[tokio::test]
async fn sector_grant_rejects_global_namespace_codes() {
    let store = store_with_miner().await;
    let access = access(&store);
    let admin_ctx = AuthContext::new("user-1", "admin", None);

    let err = access
        .grant_sector_access(
            &admin_ctx,
            SectorAccessRecord {
                user_id: "user-2".to_string(),
                mine_id: "mine-1".to_string(),
                sector_id: "sector-a".to_string(),
                permissions: vec![permissions::MANAGE_USERS.to_string()],
            },
        )
        .await
        .expect_err("namespace violation");
    assert!(matches!(err, minemon_access::AccessError::UnknownPermission(_)));
}
