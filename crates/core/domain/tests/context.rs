use domain::{Role, TenantContext};

#[test]
fn tenant_context_builds() {
    let ctx = TenantContext::new(
        "tenant-1",
        "user-1",
        vec![Role::Admin],
        vec!["TRIP.OPEN".to_string()],
        None,
    );

    assert_eq!(ctx.tenant_id, "tenant-1");
    assert_eq!(ctx.user_id, "user-1");
    assert!(ctx.has_role(Role::Admin));
    assert!(!ctx.has_role(Role::Supervisor));
    assert!(ctx.has_permission("TRIP.OPEN"));
    assert!(!ctx.has_permission("TRIP.CLOSE"));
    assert!(ctx.site_scope.is_none());
    assert!(ctx.origin.is_none());
}

#[test]
fn supervisor_defaults_cannot_manage_devices() {
    let permissions = domain::permissions::defaults_for_role(Role::Supervisor);
    assert!(permissions.iter().any(|code| code == "TRIP.OPEN"));
    assert!(!permissions.iter().any(|code| code == "ASSET.DEVICE.ENABLE"));
}
