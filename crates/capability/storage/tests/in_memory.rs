use domain::{DeviceType, Role, TenantContext};
use vls_storage::{
    DeviceRecord, DeviceStore, InMemoryDeviceStore, InMemoryUserStore, UserStore,
};

fn ctx() -> TenantContext {
    TenantContext::new("tenant-1", "user-1", vec![Role::Admin], Vec::new(), None)
}

fn device(device_id: &str, site_id: Option<&str>, enabled: bool) -> DeviceRecord {
    DeviceRecord {
        device_id: device_id.to_string(),
        tenant_id: "tenant-1".to_string(),
        site_id: site_id.map(|value| value.to_string()),
        name: format!("barrier {device_id}"),
        device_type: DeviceType::Barrier,
        serial: None,
        enabled,
    }
}

#[tokio::test]
async fn find_default_admin() {
    let store = InMemoryUserStore::with_default_admin();
    let ctx = TenantContext::default();
    let user = store
        .find_by_username(&ctx, "admin")
        .await
        .expect("query")
        .expect("admin");
    assert_eq!(user.username, "admin");
    assert_eq!(user.tenant_id, "tenant-1");
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn enabled_device_counts_respect_type_site_and_exclusion() {
    let store = InMemoryDeviceStore::new();
    let ctx = ctx();
    store
        .create_device(&ctx, device("dev-1", Some("site-a"), true))
        .await
        .expect("create");
    store
        .create_device(&ctx, device("dev-2", Some("site-b"), true))
        .await
        .expect("create");
    store
        .create_device(&ctx, device("dev-3", Some("site-a"), false))
        .await
        .expect("create");

    let tenant_wide = store
        .count_enabled_devices(&ctx, DeviceType::Barrier, None)
        .await
        .expect("count");
    assert_eq!(tenant_wide, 2);

    let site_a = store
        .count_enabled_devices_at_site(&ctx, "site-a", DeviceType::Barrier, None)
        .await
        .expect("count");
    assert_eq!(site_a, 1);

    let excluding_self = store
        .count_enabled_devices(&ctx, DeviceType::Barrier, Some("dev-1"))
        .await
        .expect("count");
    assert_eq!(excluding_self, 1);

    let anpr = store
        .count_enabled_devices(&ctx, DeviceType::Anpr, None)
        .await
        .expect("count");
    assert_eq!(anpr, 0);
}

#[tokio::test]
async fn devices_are_tenant_isolated() {
    let store = InMemoryDeviceStore::new();
    let ctx = ctx();
    store
        .create_device(&ctx, device("dev-1", None, true))
        .await
        .expect("create");

    let other = TenantContext::new("tenant-2", "user-9", vec![Role::Admin], Vec::new(), None);
    assert!(store
        .find_device(&other, "dev-1")
        .await
        .expect("query")
        .is_none());
    assert_eq!(
        store
            .count_enabled_devices(&other, DeviceType::Barrier, None)
            .await
            .expect("count"),
        0
    );
}
