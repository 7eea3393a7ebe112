//! 配额能力：套餐限额下的设备启用门控。
//!
//! 只有"启用"受配额约束：创建停用设备、停用任何设备都直接放行。
//! 启用路径按 (tenant_id, device_type) 串行化——计数与翻转在同一把
//! 键锁内完成，并发启用不会双双通过最后一个名额。换套餐只影响
//! 之后的启用尝试，已启用设备不回收。

use domain::{DeviceType, Role, TenantContext};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use vls_storage::{ClientStore, DeviceRecord, DeviceStore, UserStore};
use vls_telemetry::{record_quota_admitted, record_quota_denied};

/// 配额检查错误。
#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    /// 套餐限额为 0：该设备类型被直接禁止，与"尚未用满"无关。
    #[error("device type {0:?} not allowed by plan")]
    DeviceTypeNotAllowed(DeviceType),
    #[error("tenant-wide limit of {limit} enabled devices reached")]
    TenantLimitExceeded { limit: i64 },
    #[error("site limit of {limit} enabled devices reached")]
    SiteLimitExceeded { limit: i64 },
    #[error("tenant inactive")]
    TenantInactive,
    #[error("staff limit of {limit} reached for role")]
    StaffLimitExceeded { limit: i64 },
    #[error("device not found")]
    DeviceNotFound,
    #[error("storage error: {0}")]
    Storage(String),
}

/// 配额执行器。
pub struct QuotaEnforcer {
    client_store: Arc<dyn ClientStore>,
    device_store: Arc<dyn DeviceStore>,
    user_store: Arc<dyn UserStore>,
    activation_locks: Mutex<HashMap<(String, DeviceType), Arc<Mutex<()>>>>,
}

impl QuotaEnforcer {
    pub fn new(
        client_store: Arc<dyn ClientStore>,
        device_store: Arc<dyn DeviceStore>,
        user_store: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            client_store,
            device_store,
            user_store,
            activation_locks: Mutex::new(HashMap::new()),
        }
    }

    /// 纯检查：当前计数下能否再启用一台该类型设备。
    ///
    /// `exclude_device_id` 用于重评估正被翻转的设备自身。检查顺序：
    /// 租户在营 → 限额非 0 → 租户级计数 → 站点级计数（同一限额）。
    pub async fn authorize(
        &self,
        ctx: &TenantContext,
        site_id: Option<&str>,
        device_type: DeviceType,
        exclude_device_id: Option<&str>,
    ) -> Result<(), QuotaError> {
        let client = self
            .client_store
            .find_client(&ctx.tenant_id)
            .await
            .map_err(|err| QuotaError::Storage(err.to_string()))?
            .ok_or(QuotaError::TenantInactive)?;
        if !client.is_active() {
            return deny(QuotaError::TenantInactive);
        }
        let limit = client.limits.device_limit_for(device_type);
        if limit == 0 {
            return deny(QuotaError::DeviceTypeNotAllowed(device_type));
        }
        let tenant_count = self
            .device_store
            .count_enabled_devices(ctx, device_type, exclude_device_id)
            .await
            .map_err(|err| QuotaError::Storage(err.to_string()))?;
        if tenant_count >= limit {
            return deny(QuotaError::TenantLimitExceeded { limit });
        }
        if let Some(site_id) = site_id {
            let site_count = self
                .device_store
                .count_enabled_devices_at_site(ctx, site_id, device_type, exclude_device_id)
                .await
                .map_err(|err| QuotaError::Storage(err.to_string()))?;
            if site_count >= limit {
                return deny(QuotaError::SiteLimitExceeded { limit });
            }
        }
        Ok(())
    }

    /// 启用设备：持 (tenant, device_type) 键锁重查计数后翻转。
    pub async fn enable_device(
        &self,
        ctx: &TenantContext,
        device_id: &str,
    ) -> Result<DeviceRecord, QuotaError> {
        let device = self
            .device_store
            .find_device(ctx, device_id)
            .await
            .map_err(|err| QuotaError::Storage(err.to_string()))?
            .ok_or(QuotaError::DeviceNotFound)?;

        let lock = self
            .activation_lock(&ctx.tenant_id, device.device_type)
            .await;
        let _guard = lock.lock().await;

        // 计数必须在锁内重新评估：锁外读到的世界可能已经变了
        self.authorize(
            ctx,
            device.site_id.as_deref(),
            device.device_type,
            Some(device_id),
        )
        .await?;
        let updated = self
            .device_store
            .set_device_enabled(ctx, device_id, true)
            .await
            .map_err(|err| QuotaError::Storage(err.to_string()))?
            .ok_or(QuotaError::DeviceNotFound)?;
        record_quota_admitted();
        info!(
            target: "vls.quota",
            tenant_id = %ctx.tenant_id,
            device_id = %device_id,
            device_type = device.device_type.as_db(),
            "device_enabled"
        );
        Ok(updated)
    }

    /// 停用设备：永远放行，不走配额。
    pub async fn disable_device(
        &self,
        ctx: &TenantContext,
        device_id: &str,
    ) -> Result<DeviceRecord, QuotaError> {
        let updated = self
            .device_store
            .set_device_enabled(ctx, device_id, false)
            .await
            .map_err(|err| QuotaError::Storage(err.to_string()))?
            .ok_or(QuotaError::DeviceNotFound)?;
        info!(
            target: "vls.quota",
            tenant_id = %ctx.tenant_id,
            device_id = %device_id,
            "device_disabled"
        );
        Ok(updated)
    }

    /// 员工名额检查：按封闭角色枚举穷尽分发。
    pub async fn authorize_staff(
        &self,
        ctx: &TenantContext,
        role: Role,
    ) -> Result<(), QuotaError> {
        let client = self
            .client_store
            .find_client(&ctx.tenant_id)
            .await
            .map_err(|err| QuotaError::Storage(err.to_string()))?
            .ok_or(QuotaError::TenantInactive)?;
        if !client.is_active() {
            return deny(QuotaError::TenantInactive);
        }
        let Some(limit) = client.limits.staff_limit_for(role) else {
            return Ok(());
        };
        let count = self
            .user_store
            .count_users_with_role(ctx, role)
            .await
            .map_err(|err| QuotaError::Storage(err.to_string()))?;
        if count >= limit {
            return deny(QuotaError::StaffLimitExceeded { limit });
        }
        Ok(())
    }

    async fn activation_lock(&self, tenant_id: &str, device_type: DeviceType) -> Arc<Mutex<()>> {
        let mut locks = self.activation_locks.lock().await;
        Arc::clone(
            locks
                .entry((tenant_id.to_string(), device_type))
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

fn deny(error: QuotaError) -> Result<(), QuotaError> {
    record_quota_denied();
    Err(error)
}
