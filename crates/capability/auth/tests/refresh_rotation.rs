use minemon_auth::{AuthService, JwtManager};
use minemon_storage::InMemoryUserStore;
use std::sync::Arc;

fn service() -> AuthService {
    let store = Arc::new(InMemoryUserStore::with_default_admin());
    let jwt = JwtManager::new("secret".to_string(), 3600, 7200);
    AuthService::new(store, jwt)
}

#[tokio::test]
async fn refresh_rotates_the_binding() {
    let auth = service();
    let (_, tokens) = auth
        .login("admin@minemon.local", "admin123")
        .await
        .expect("login");

    let rotated = auth.refresh(&tokens.refresh_token).await.expect("refresh");
    assert_ne!(rotated.refresh_jti, tokens.refresh_jti);

    // 旧 refresh token 已作废
    assert!(auth.refresh(&tokens.refresh_token).await.is_err());
    // 新 token 可以继续换
    auth.refresh(&rotated.refresh_token).await.expect("refresh");
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let auth = service();
    assert!(auth.login("admin@minemon.local", "nope").await.is_err());
    assert!(auth.login("ghost@minemon.local", "admin123").await.is_err());
}

#[tokio::test]
async fn logout_invalidates_refresh_token() {
    let auth = service();
    let (user, tokens) = auth
        .login("admin@minemon.local", "admin123")
        .await
        .expect("login");
    auth.logout(&user.to_auth_context()).await.expect("logout");
    assert!(auth.refresh(&tokens.refresh_token).await.is_err());
}
