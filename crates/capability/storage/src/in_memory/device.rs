//! 设备内存存储实现
//!
//! 仅用于本地演示和测试。
//!
//! 功能：
//! - 设备 CRUD 操作
//! - 启用计数（租户级 / 站点级，支持排除自身）
//! - 租户隔离验证

use crate::error::StorageError;
use crate::models::{DeviceRecord, DeviceUpdate};
use crate::traits::DeviceStore;
use crate::validation::ensure_tenant;
use domain::{DeviceType, TenantContext};
use std::collections::HashMap;
use std::sync::RwLock;

/// 设备内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
pub struct InMemoryDeviceStore {
    pub(crate) devices: RwLock<HashMap<String, DeviceRecord>>,
}

impl InMemoryDeviceStore {
    /// 创建新的设备存储
    pub fn new() -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn list_devices(&self, ctx: &TenantContext) -> Result<Vec<DeviceRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let devices = self
            .devices
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<DeviceRecord> = devices
            .values()
            .filter(|item| item.tenant_id == ctx.tenant_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        Ok(items)
    }

    async fn find_device(
        &self,
        ctx: &TenantContext,
        device_id: &str,
    ) -> Result<Option<DeviceRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let devices = self
            .devices
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(devices
            .get(device_id)
            .filter(|item| item.tenant_id == ctx.tenant_id)
            .cloned())
    }

    async fn create_device(
        &self,
        ctx: &TenantContext,
        record: DeviceRecord,
    ) -> Result<DeviceRecord, StorageError> {
        ensure_tenant(ctx)?;
        if record.tenant_id != ctx.tenant_id {
            return Err(StorageError::new("tenant mismatch"));
        }
        let mut devices = self
            .devices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        devices.insert(record.device_id.clone(), record.clone());
        Ok(record)
    }

    async fn update_device(
        &self,
        ctx: &TenantContext,
        device_id: &str,
        update: DeviceUpdate,
    ) -> Result<Option<DeviceRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let mut devices = self
            .devices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(record) = devices
            .get_mut(device_id)
            .filter(|item| item.tenant_id == ctx.tenant_id)
        else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            record.name = name;
        }
        if let Some(site_id) = update.site_id {
            record.site_id = Some(site_id);
        }
        if let Some(serial) = update.serial {
            record.serial = Some(serial);
        }
        Ok(Some(record.clone()))
    }

    async fn delete_device(
        &self,
        ctx: &TenantContext,
        device_id: &str,
    ) -> Result<bool, StorageError> {
        ensure_tenant(ctx)?;
        let mut devices = self
            .devices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let owned = devices
            .get(device_id)
            .map(|item| item.tenant_id == ctx.tenant_id)
            .unwrap_or(false);
        if !owned {
            return Ok(false);
        }
        devices.remove(device_id);
        Ok(true)
    }

    async fn count_enabled_devices(
        &self,
        ctx: &TenantContext,
        device_type: DeviceType,
        exclude_device_id: Option<&str>,
    ) -> Result<i64, StorageError> {
        ensure_tenant(ctx)?;
        let devices = self
            .devices
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let count = devices
            .values()
            .filter(|item| {
                item.tenant_id == ctx.tenant_id
                    && item.device_type == device_type
                    && item.enabled
                    && exclude_device_id != Some(item.device_id.as_str())
            })
            .count();
        Ok(count as i64)
    }

    async fn count_enabled_devices_at_site(
        &self,
        ctx: &TenantContext,
        site_id: &str,
        device_type: DeviceType,
        exclude_device_id: Option<&str>,
    ) -> Result<i64, StorageError> {
        ensure_tenant(ctx)?;
        let devices = self
            .devices
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let count = devices
            .values()
            .filter(|item| {
                item.tenant_id == ctx.tenant_id
                    && item.site_id.as_deref() == Some(site_id)
                    && item.device_type == device_type
                    && item.enabled
                    && exclude_device_id != Some(item.device_id.as_str())
            })
            .count();
        Ok(count as i64)
    }

    async fn set_device_enabled(
        &self,
        ctx: &TenantContext,
        device_id: &str,
        enabled: bool,
    ) -> Result<Option<DeviceRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let mut devices = self
            .devices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(record) = devices
            .get_mut(device_id)
            .filter(|item| item.tenant_id == ctx.tenant_id)
        else {
            return Ok(None);
        };
        record.enabled = enabled;
        Ok(Some(record.clone()))
    }
}
