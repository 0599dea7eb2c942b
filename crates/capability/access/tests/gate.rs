use domain::permissions::{self, Scope};
use domain::AuthContext;
use minemon_access::{AccessControl, AccessError};
use minemon_storage::{
    InMemoryUserStore, RbacStore, RbacUserCreate, RoleCreate, SectorAccessRecord,
};
use std::sync::Arc;

fn access(store: &Arc<InMemoryUserStore>) -> AccessControl {
    AccessControl::new(store.clone(), store.clone())
}

async fn seed_miner(store: &Arc<InMemoryUserStore>) -> AuthContext {
    let admin_ctx = AuthContext::new("user-1", "admin", None);
    store
        .create_role(
            &admin_ctx,
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
            &admin_ctx,
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
        .grant_sector_access(
            &admin_ctx,
            SectorAccessRecord {
                user_id: "user-2".to_string(),
                mine_id: "mine-1".to_string(),
                sector_id: "sector-a".to_string(),
                permissions: vec![permissions::VIEW_SECTOR_SENSORS.to_string()],
            },
        )
        .await
        .expect("grant");
    AuthContext::new("user-2", "miner-1", None)
}

#[tokio::test]
async fn miner_sector_authorization_end_to_end() {
    let store = Arc::new(InMemoryUserStore::with_default_admin());
    let access = access(&store);
    let ctx = seed_miner(&store).await;

    let scope_a = Scope::sector("mine-1", "sector-a");
    let scope_b = Scope::sector("mine-1", "sector-b");

    assert!(!access
        .authorize(&ctx, "user-2", permissions::MANAGE_SECTOR_SENSORS, &scope_a)
        .await
        .expect("authorize"));
    assert!(access
        .authorize(&ctx, "user-2", permissions::VIEW_SECTOR_SENSORS, &scope_a)
        .await
        .expect("authorize"));
    assert!(!access
        .authorize(&ctx, "user-2", permissions::VIEW_SECTOR_SENSORS, &scope_b)
        .await
        .expect("authorize"));
}

#[tokio::test]
async fn deny_by_default_for_unknown_codes_and_wrong_namespace() {
    let store = Arc::new(InMemoryUserStore::with_default_admin());
    let access = access(&store);
    let ctx = AuthContext::new("user-1", "admin", None);

    // admin 持有全部全局权限，但未知权限码仍然拒绝
    assert!(!access
        .authorize(&ctx, "user-1", "rule_the_world", &Scope::Global)
        .await
        .expect("authorize"));
    // 全局权限码用在分区作用域同样拒绝
    assert!(!access
        .authorize(
            &ctx,
            "user-1",
            permissions::MANAGE_USERS,
            &Scope::sector("mine-1", "sector-a")
        )
        .await
        .expect("authorize"));
}

#[tokio::test]
async fn disabled_account_is_denied_everything() {
    let store = Arc::new(InMemoryUserStore::with_default_admin());
    let access = access(&store);
    let ctx = seed_miner(&store).await;
    let admin_ctx = AuthContext::new("user-1", "admin", None);

    store
        .update_user(
            &admin_ctx,
            "user-2",
            minemon_storage::RbacUserUpdate {
                password: None,
                status: Some("inactive".to_string()),
            },
        )
        .await
        .expect("update");

    assert!(!access
        .authorize(
            &ctx,
            "user-2",
            permissions::VIEW_SECTOR_SENSORS,
            &Scope::sector("mine-1", "sector-a")
        )
        .await
        .expect("authorize"));
}

#[tokio::test]
async fn sole_admin_cannot_be_removed() {
    let store = Arc::new(InMemoryUserStore::with_default_admin());
    let access = access(&store);
    let ctx = AuthContext::new("user-1", "admin", None);

    let err = access
        .ensure_not_last_admin(&ctx, "user-1")
        .await
        .expect_err("protected");
    assert!(matches!(err, AccessError::LastAdminProtected));
}

#[tokio::test]
async fn second_admin_unlocks_removal() {
    let store = Arc::new(InMemoryUserStore::with_default_admin());
    let access = access(&store);
    let ctx = AuthContext::new("user-1", "admin", None);

    store
        .create_user(
            &ctx,
            RbacUserCreate {
                user_id: "user-9".to_string(),
                username: "admin-2".to_string(),
                email: "admin-2@minemon.local".to_string(),
                password: "hash".to_string(),
                status: "active".to_string(),
                role_code: Some(permissions::ROLE_ADMIN.to_string()),
            },
        )
        .await
        .expect("user");

    access
        .ensure_not_last_admin(&ctx, "user-1")
        .await
        .expect("two admins, removable");
}

#[tokio::test]
async fn non_admin_targets_are_never_protected() {
    let store = Arc::new(InMemoryUserStore::with_default_admin());
    let access = access(&store);
    let _ = seed_miner(&store).await;
    let ctx = AuthContext::new("user-1", "admin", None);

    access
        .ensure_not_last_admin(&ctx, "user-2")
        .await
        .expect("miner is not protected");
}
