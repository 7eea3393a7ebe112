//! 应用状态装配
//!
//! 按配置选择存储后端并把存储、配额、行程台账、闸机控制器
//! 组装为共享的 AppState。

use std::sync::Arc;
use vls_agent::AgentChannel;
use vls_auth::{AuthService, JwtManager};
use vls_config::AppConfig;
use vls_control::{BarrierController, BarrierControllerConfig};
use vls_quota::QuotaEnforcer;
use vls_storage::{
    AuditLogStore, AuditSink, ClientStore, DeviceStore, InMemoryAuditLogStore,
    InMemoryClientStore, InMemoryDeviceStore, InMemoryOnlineStore, InMemoryPlanStore,
    InMemorySiteStore, InMemoryTenantLifecycleStore, InMemoryTripStore, InMemoryUserStore,
    InMemoryVendorStore, OnlineStore, PgAuditLogStore, PgClientStore, PgDeviceStore,
    PgPlanStore, PgSiteStore, PgTenantLifecycleStore, PgTripStore, PgUserStore, PgVendorStore,
    PlanStore, RedisOnlineStore, SiteStore, StorageError, TenantLifecycleStore, TripStore,
    UserStore, VendorStore, connect_pool,
};
use vls_trip::TripLedger;

/// 共享应用状态。
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub plan_store: Arc<dyn PlanStore>,
    pub client_store: Arc<dyn ClientStore>,
    pub site_store: Arc<dyn SiteStore>,
    pub vendor_store: Arc<dyn VendorStore>,
    pub device_store: Arc<dyn DeviceStore>,
    pub user_store: Arc<dyn UserStore>,
    pub trip_store: Arc<dyn TripStore>,
    pub audit_log_store: Arc<dyn AuditLogStore>,
    pub online_store: Arc<dyn OnlineStore>,
    pub lifecycle_store: Arc<dyn TenantLifecycleStore>,
    pub quota: Arc<QuotaEnforcer>,
    pub trips: TripLedger,
    pub barrier: BarrierController,
    pub audit: AuditSink,
    pub agent_channel: Arc<AgentChannel>,
}

/// 按配置构建应用状态。
pub async fn build_state(config: &AppConfig) -> Result<AppState, StorageError> {
    let stores = match &config.database_url {
        Some(database_url) => {
            tracing::info!(target: "vls.api", "storage backend: postgres");
            postgres_stores(database_url, config).await?
        }
        None => {
            tracing::info!(target: "vls.api", "storage backend: in-memory (demo seed)");
            memory_stores(config)
        }
    };
    Ok(assemble(config, stores))
}

struct Stores {
    plan_store: Arc<dyn PlanStore>,
    client_store: Arc<dyn ClientStore>,
    site_store: Arc<dyn SiteStore>,
    vendor_store: Arc<dyn VendorStore>,
    device_store: Arc<dyn DeviceStore>,
    user_store: Arc<dyn UserStore>,
    trip_store: Arc<dyn TripStore>,
    audit_log_store: Arc<dyn AuditLogStore>,
    online_store: Arc<dyn OnlineStore>,
    lifecycle_store: Arc<dyn TenantLifecycleStore>,
}

async fn postgres_stores(database_url: &str, config: &AppConfig) -> Result<Stores, StorageError> {
    let pool = connect_pool(database_url).await?;
    let online_store: Arc<dyn OnlineStore> = match &config.redis_url {
        Some(redis_url) => Arc::new(RedisOnlineStore::connect(
            redis_url,
            config.redis_online_ttl_seconds,
        )?),
        None => Arc::new(InMemoryOnlineStore::new(config.redis_online_ttl_seconds)),
    };
    Ok(Stores {
        plan_store: Arc::new(PgPlanStore::new(pool.clone())),
        client_store: Arc::new(PgClientStore::new(pool.clone())),
        site_store: Arc::new(PgSiteStore::new(pool.clone())),
        vendor_store: Arc::new(PgVendorStore::new(pool.clone())),
        device_store: Arc::new(PgDeviceStore::new(pool.clone())),
        user_store: Arc::new(PgUserStore::new(pool.clone())),
        trip_store: Arc::new(PgTripStore::new(pool.clone())),
        audit_log_store: Arc::new(PgAuditLogStore::new(pool.clone())),
        online_store,
        lifecycle_store: Arc::new(PgTenantLifecycleStore::new(pool)),
    })
}

fn memory_stores(config: &AppConfig) -> Stores {
    let clients = Arc::new(InMemoryClientStore::with_default_client());
    let devices = Arc::new(InMemoryDeviceStore::new());
    let users = Arc::new(InMemoryUserStore::with_default_admin());
    let lifecycle = Arc::new(InMemoryTenantLifecycleStore::new(
        Arc::clone(&clients),
        Arc::clone(&devices),
        Arc::clone(&users),
    ));
    Stores {
        plan_store: Arc::new(InMemoryPlanStore::with_default_plans()),
        client_store: clients,
        site_store: Arc::new(InMemorySiteStore::new()),
        vendor_store: Arc::new(InMemoryVendorStore::new()),
        device_store: devices,
        user_store: users,
        trip_store: Arc::new(InMemoryTripStore::new()),
        audit_log_store: Arc::new(InMemoryAuditLogStore::new()),
        online_store: Arc::new(InMemoryOnlineStore::new(config.redis_online_ttl_seconds)),
        lifecycle_store: lifecycle,
    }
}

fn assemble(config: &AppConfig, stores: Stores) -> AppState {
    let jwt = JwtManager::new(
        config.jwt_secret.clone(),
        config.jwt_access_ttl_seconds,
        config.jwt_refresh_ttl_seconds,
    );
    let auth = Arc::new(AuthService::new(
        Arc::clone(&stores.user_store),
        Arc::clone(&stores.client_store),
        jwt,
    ));
    let audit = AuditSink::new(Arc::clone(&stores.audit_log_store));
    let quota = Arc::new(QuotaEnforcer::new(
        Arc::clone(&stores.client_store),
        Arc::clone(&stores.device_store),
        Arc::clone(&stores.user_store),
    ));
    let trips = TripLedger::new(Arc::clone(&stores.trip_store), audit.clone());
    let agent_channel = Arc::new(AgentChannel::new());
    let barrier = BarrierController::new(
        Arc::clone(&agent_channel),
        BarrierControllerConfig {
            call_timeout_ms: config.agent_call_timeout_ms,
        },
    );
    AppState {
        auth,
        plan_store: stores.plan_store,
        client_store: stores.client_store,
        site_store: stores.site_store,
        vendor_store: stores.vendor_store,
        device_store: stores.device_store,
        user_store: stores.user_store,
        trip_store: stores.trip_store,
        audit_log_store: stores.audit_log_store,
        online_store: stores.online_store,
        lifecycle_store: stores.lifecycle_store,
        quota,
        trips,
        barrier,
        audit,
        agent_channel,
    }
}
