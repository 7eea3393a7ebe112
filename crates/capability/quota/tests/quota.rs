use domain::{DeviceType, Role, TenantContext};
use std::sync::Arc;
use vls_quota::{QuotaEnforcer, QuotaError};
use vls_storage::{
    ClientRecord, ClientStore, DeviceRecord, DeviceStore, InMemoryClientStore,
    InMemoryDeviceStore, InMemoryUserStore, PlanLimits, UserRecord, UserStore,
};

struct Fixture {
    clients: Arc<InMemoryClientStore>,
    devices: Arc<InMemoryDeviceStore>,
    users: Arc<InMemoryUserStore>,
    quota: QuotaEnforcer,
}

fn ctx() -> TenantContext {
    TenantContext::new("tenant-1", "user-1", vec![Role::Admin], Vec::new(), None)
}

async fn fixture(limits: PlanLimits, status: &str) -> Fixture {
    let clients = Arc::new(InMemoryClientStore::new());
    let devices = Arc::new(InMemoryDeviceStore::new());
    let users = Arc::new(InMemoryUserStore::new());
    clients
        .create_client(ClientRecord {
            client_id: "tenant-1".to_string(),
            name: "Acme Logistics".to_string(),
            status: status.to_string(),
            plan_code: "basic".to_string(),
            limits,
        })
        .await
        .expect("seed client");
    let quota = QuotaEnforcer::new(
        Arc::clone(&clients) as Arc<dyn ClientStore>,
        Arc::clone(&devices) as Arc<dyn DeviceStore>,
        Arc::clone(&users) as Arc<dyn UserStore>,
    );
    Fixture {
        clients,
        devices,
        users,
        quota,
    }
}

fn limits(barrier: i64, biometric: i64) -> PlanLimits {
    PlanLimits {
        max_project_managers: 1,
        max_supervisors: 2,
        max_anpr: 4,
        max_barrier: barrier,
        max_biometric: biometric,
    }
}

async fn seed_device(
    devices: &InMemoryDeviceStore,
    device_id: &str,
    device_type: DeviceType,
    site_id: Option<&str>,
    enabled: bool,
) {
    devices
        .create_device(
            &ctx(),
            DeviceRecord {
                device_id: device_id.to_string(),
                tenant_id: "tenant-1".to_string(),
                site_id: site_id.map(|value| value.to_string()),
                name: device_id.to_string(),
                device_type,
                serial: None,
                enabled,
            },
        )
        .await
        .expect("seed device");
}

#[tokio::test]
async fn zero_limit_forbids_type_regardless_of_counts() {
    let fx = fixture(limits(2, 0), "active").await;
    seed_device(&fx.devices, "bio-1", DeviceType::Biometric, None, false).await;
    let result = fx.quota.enable_device(&ctx(), "bio-1").await;
    assert!(matches!(
        result,
        Err(QuotaError::DeviceTypeNotAllowed(DeviceType::Biometric))
    ));
}

#[tokio::test]
async fn activation_succeeds_below_limit_and_fails_at_limit() {
    let fx = fixture(limits(2, 0), "active").await;
    seed_device(&fx.devices, "bar-1", DeviceType::Barrier, Some("site-a"), false).await;
    seed_device(&fx.devices, "bar-2", DeviceType::Barrier, Some("site-a"), false).await;
    seed_device(&fx.devices, "bar-3", DeviceType::Barrier, Some("site-b"), false).await;

    let enabled = fx.quota.enable_device(&ctx(), "bar-1").await.expect("first");
    assert!(enabled.enabled);
    fx.quota.enable_device(&ctx(), "bar-2").await.expect("second");

    let result = fx.quota.enable_device(&ctx(), "bar-3").await;
    assert!(matches!(
        result,
        Err(QuotaError::TenantLimitExceeded { limit: 2 })
    ));
}

#[tokio::test]
async fn tenant_cap_blocks_other_site_even_when_empty() {
    // BARRIER 限 1：site-a 已占用名额，site-b 为空也不得启用
    let fx = fixture(limits(1, 0), "active").await;
    seed_device(&fx.devices, "bar-a", DeviceType::Barrier, Some("site-a"), true).await;
    seed_device(&fx.devices, "bar-b", DeviceType::Barrier, Some("site-b"), false).await;

    let result = fx.quota.enable_device(&ctx(), "bar-b").await;
    assert!(matches!(
        result,
        Err(QuotaError::TenantLimitExceeded { limit: 1 })
    ));
}

#[tokio::test]
async fn re_enabling_a_device_does_not_count_itself() {
    let fx = fixture(limits(1, 0), "active").await;
    seed_device(&fx.devices, "bar-1", DeviceType::Barrier, Some("site-a"), true).await;
    // 已启用设备重复启用：排除自身后计数为 0，放行且幂等
    let record = fx.quota.enable_device(&ctx(), "bar-1").await.expect("idempotent");
    assert!(record.enabled);
}

#[tokio::test]
async fn inactive_tenant_cannot_enable() {
    let fx = fixture(limits(2, 0), "inactive").await;
    seed_device(&fx.devices, "bar-1", DeviceType::Barrier, None, false).await;
    let result = fx.quota.enable_device(&ctx(), "bar-1").await;
    assert!(matches!(result, Err(QuotaError::TenantInactive)));
}

#[tokio::test]
async fn disable_is_never_gated() {
    let fx = fixture(limits(0, 0), "inactive").await;
    seed_device(&fx.devices, "bar-1", DeviceType::Barrier, None, true).await;
    let record = fx.quota.disable_device(&ctx(), "bar-1").await.expect("disable");
    assert!(!record.enabled);
}

#[tokio::test]
async fn concurrent_enables_admit_exactly_one_at_last_slot() {
    let fx = fixture(limits(1, 0), "active").await;
    for index in 0..6 {
        seed_device(
            &fx.devices,
            &format!("bar-{index}"),
            DeviceType::Barrier,
            Some("site-a"),
            false,
        )
        .await;
    }
    let quota = Arc::new(fx.quota);
    let mut handles = Vec::new();
    for index in 0..6 {
        let quota = Arc::clone(&quota);
        handles.push(tokio::spawn(async move {
            quota.enable_device(&ctx(), &format!("bar-{index}")).await
        }));
    }
    let mut admitted = 0;
    for handle in handles {
        if handle.await.expect("join").is_ok() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 1);
    let enabled = fx
        .devices
        .count_enabled_devices(&ctx(), DeviceType::Barrier, None)
        .await
        .expect("count");
    assert_eq!(enabled, 1);
}

#[tokio::test]
async fn plan_change_applies_to_next_activation_only() {
    let fx = fixture(limits(2, 0), "active").await;
    seed_device(&fx.devices, "bar-1", DeviceType::Barrier, None, true).await;
    seed_device(&fx.devices, "bar-2", DeviceType::Barrier, None, true).await;
    seed_device(&fx.devices, "bar-3", DeviceType::Barrier, None, false).await;

    // 降档到 1：已启用的两台不回收
    fx.clients
        .change_plan("tenant-1", "tiny", limits(1, 0))
        .await
        .expect("change plan")
        .expect("client");
    let first = fx
        .devices
        .find_device(&ctx(), "bar-1")
        .await
        .expect("query")
        .expect("device");
    assert!(first.enabled);

    // 但下一次启用按新限额拒绝
    let result = fx.quota.enable_device(&ctx(), "bar-3").await;
    assert!(matches!(
        result,
        Err(QuotaError::TenantLimitExceeded { limit: 1 })
    ));
}

#[tokio::test]
async fn staff_limits_follow_role_enum() {
    let fx = fixture(limits(2, 0), "active").await;
    for index in 0..2 {
        fx.users
            .create_user(
                &ctx(),
                UserRecord {
                    user_id: format!("sup-{index}"),
                    tenant_id: "tenant-1".to_string(),
                    username: format!("supervisor-{index}"),
                    password: "hash".to_string(),
                    role: Role::Supervisor,
                    status: "active".to_string(),
                    permissions: Vec::new(),
                    refresh_jti: None,
                },
            )
            .await
            .expect("seed user");
    }
    // max_supervisors = 2 已用满
    let result = fx.quota.authorize_staff(&ctx(), Role::Supervisor).await;
    assert!(matches!(
        result,
        Err(QuotaError::StaffLimitExceeded { limit: 2 })
    ));
    // 管理员不设限
    fx.quota
        .authorize_staff(&ctx(), Role::Admin)
        .await
        .expect("admin unlimited");
    // 项目经理还有名额
    fx.quota
        .authorize_staff(&ctx(), Role::ProjectManager)
        .await
        .expect("pm below limit");
}
