//! Online 状态内存实现
//!
//! 仅用于本地演示和测试。TTL 逻辑：超过 ttl 的 last_seen 视为离线。

use crate::error::StorageError;
use crate::online::OnlineStore;
use crate::validation::ensure_tenant;
use domain::TenantContext;
use std::collections::HashMap;
use std::sync::RwLock;

/// Online 状态内存存储（键为 tenant_id:device_id）。
pub struct InMemoryOnlineStore {
    ttl_ms: i64,
    entries: RwLock<HashMap<String, i64>>,
}

impl InMemoryOnlineStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            ttl_ms: (ttl_seconds.max(1) * 1000) as i64,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn key(tenant_id: &str, device_id: &str) -> String {
        format!("{}:{}", tenant_id, device_id)
    }

    fn fresh(&self, last_seen_at_ms: i64) -> bool {
        let now = crate::audit::epoch_ms_now();
        now - last_seen_at_ms <= self.ttl_ms
    }
}

#[async_trait::async_trait]
impl OnlineStore for InMemoryOnlineStore {
    async fn touch_device(
        &self,
        ctx: &TenantContext,
        device_id: &str,
        ts_ms: i64,
    ) -> Result<(), StorageError> {
        ensure_tenant(ctx)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        entries.insert(Self::key(&ctx.tenant_id, device_id), ts_ms);
        Ok(())
    }

    async fn get_device_last_seen_at_ms(
        &self,
        ctx: &TenantContext,
        device_id: &str,
    ) -> Result<Option<i64>, StorageError> {
        ensure_tenant(ctx)?;
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(entries
            .get(&Self::key(&ctx.tenant_id, device_id))
            .copied()
            .filter(|ts_ms| self.fresh(*ts_ms)))
    }

    async fn list_devices_last_seen_at_ms(
        &self,
        ctx: &TenantContext,
        device_ids: &[String],
    ) -> Result<HashMap<String, i64>, StorageError> {
        ensure_tenant(ctx)?;
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut result = HashMap::new();
        for device_id in device_ids {
            if let Some(ts_ms) = entries.get(&Self::key(&ctx.tenant_id, device_id)) {
                if self.fresh(*ts_ms) {
                    result.insert(device_id.clone(), *ts_ms);
                }
            }
        }
        Ok(result)
    }

    async fn clear_tenant(&self, tenant_id: &str) -> Result<(), StorageError> {
        let prefix = format!("{}:", tenant_id);
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        entries.retain(|key, _| !key.starts_with(&prefix));
        Ok(())
    }
}
