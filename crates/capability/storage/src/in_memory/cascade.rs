//! 租户停用级联的内存实现
//!
//! 同时持有客户/设备/用户三个内存存储，并在全部写锁内应用级联：
//! 三步都是纯内存赋值，拿到锁后不会失败，因此整体等价于原子生效。

use crate::error::StorageError;
use crate::in_memory::{InMemoryClientStore, InMemoryDeviceStore, InMemoryUserStore};
use crate::traits::TenantLifecycleStore;
use std::sync::Arc;

/// 租户停用级联（内存实现）。
pub struct InMemoryTenantLifecycleStore {
    clients: Arc<InMemoryClientStore>,
    devices: Arc<InMemoryDeviceStore>,
    users: Arc<InMemoryUserStore>,
}

impl InMemoryTenantLifecycleStore {
    pub fn new(
        clients: Arc<InMemoryClientStore>,
        devices: Arc<InMemoryDeviceStore>,
        users: Arc<InMemoryUserStore>,
    ) -> Self {
        Self {
            clients,
            devices,
            users,
        }
    }
}

#[async_trait::async_trait]
impl TenantLifecycleStore for InMemoryTenantLifecycleStore {
    async fn deactivate_client(&self, client_id: &str) -> Result<bool, StorageError> {
        // 固定加锁顺序 clients → devices → users，避免与其他级联互相等待。
        let mut clients = self
            .clients
            .clients
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut devices = self
            .devices
            .devices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut users = self
            .users
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;

        let Some(client) = clients.get_mut(client_id) else {
            return Ok(false);
        };
        client.status = "inactive".to_string();
        for device in devices.values_mut() {
            if device.tenant_id == client_id {
                device.enabled = false;
            }
        }
        for user in users.values_mut() {
            if user.tenant_id == client_id {
                user.refresh_jti = None;
            }
        }
        Ok(true)
    }
}
