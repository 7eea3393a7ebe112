use domain::{Role, TenantContext};
use vls_auth::JwtManager;

#[test]
fn jwt_issue_and_decode() {
    let jwt = JwtManager::new("secret".to_string(), 3600, 7200);
    let ctx = TenantContext::new(
        "tenant-1",
        "user-1",
        vec![Role::Admin],
        vec!["TRIP.OPEN".to_string()],
        None,
    );

    let tokens = jwt.issue_tokens(&ctx).expect("tokens");
    let access_ctx = jwt.decode_access(&tokens.access_token).expect("access");
    let refresh_ctx = jwt.decode_refresh(&tokens.refresh_token).expect("refresh");

    assert_eq!(access_ctx.tenant_id, "tenant-1");
    assert!(access_ctx.has_role(Role::Admin));
    assert_eq!(refresh_ctx.user_id, "user-1");
}

#[test]
fn access_token_is_not_a_refresh_token() {
    let jwt = JwtManager::new("secret".to_string(), 3600, 7200);
    let ctx = TenantContext::new("tenant-1", "user-1", vec![Role::Supervisor], vec![], None);
    let tokens = jwt.issue_tokens(&ctx).expect("tokens");
    assert!(jwt.decode_refresh(&tokens.access_token).is_err());
    assert!(jwt.decode_access(&tokens.refresh_token).is_err());
}
