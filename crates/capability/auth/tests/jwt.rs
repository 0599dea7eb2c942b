use domain::AuthContext;
use minemon_auth::JwtManager;

#[test]
fn jwt_issue_and_decode() {
    let jwt = JwtManager::new("secret".to_string(), 3600, 7200);
    let ctx = AuthContext::new("user-1", "foreman", None);

    let tokens = jwt.issue_tokens(&ctx).expect("tokens");
    let access_ctx = jwt.decode_access(&tokens.access_token).expect("access");
    let refresh_ctx = jwt.decode_refresh(&tokens.refresh_token).expect("refresh");

    assert_eq!(access_ctx.user_id, "user-1");
    assert_eq!(access_ctx.username, "foreman");
    assert_eq!(refresh_ctx.user_id, "user-1");
}

#[test]
fn token_types_are_not_interchangeable() {
    let jwt = JwtManager::new("secret".to_string(), 3600, 7200);
    let ctx = AuthContext::new("user-1", "foreman", None);

    let tokens = jwt.issue_tokens(&ctx).expect("tokens");
    assert!(jwt.decode_access(&tokens.refresh_token).is_err());
    assert!(jwt.decode_refresh(&tokens.access_token).is_err());
}

#[test]
fn wrong_secret_is_rejected() {
    let jwt = JwtManager::new("secret".to_string(), 3600, 7200);
    let other = JwtManager::new("other".to_string(), 3600, 7200);
    let ctx = AuthContext::new("user-1", "foreman", None);

    let tokens = jwt.issue_tokens(&ctx).expect("tokens");
    assert!(other.decode_access(&tokens.access_token).is_err());
}
