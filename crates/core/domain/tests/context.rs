use domain::AuthContext;

#[test]
fn auth_context_builds() {
    let ctx = AuthContext::new("user-1", "foreman", Some("mine-1".to_string()));

    assert_eq!(ctx.user_id, "user-1");
    assert_eq!(ctx.username, "foreman");
    assert_eq!(ctx.mine_scope.as_deref(), Some("mine-1"));
}

#[test]
fn system_context_has_fixed_identity() {
    let ctx = AuthContext::system();
    assert_eq!(ctx.user_id, "system");
    assert!(ctx.mine_scope.is_none());
}
