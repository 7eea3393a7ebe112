//! 承运商内存存储实现
//!
//! 仅用于本地演示和测试。

use crate::error::StorageError;
use crate::models::{VendorRecord, VendorUpdate};
use crate::traits::VendorStore;
use crate::validation::ensure_tenant;
use domain::TenantContext;
use std::collections::HashMap;
use std::sync::RwLock;

/// 承运商内存存储
pub struct InMemoryVendorStore {
    vendors: RwLock<HashMap<String, VendorRecord>>,
}

impl InMemoryVendorStore {
    pub fn new() -> Self {
        Self {
            vendors: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl VendorStore for InMemoryVendorStore {
    async fn list_vendors(&self, ctx: &TenantContext) -> Result<Vec<VendorRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let vendors = self
            .vendors
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<VendorRecord> = vendors
            .values()
            .filter(|item| item.tenant_id == ctx.tenant_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.vendor_id.cmp(&b.vendor_id));
        Ok(items)
    }

    async fn find_vendor(
        &self,
        ctx: &TenantContext,
        vendor_id: &str,
    ) -> Result<Option<VendorRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let vendors = self
            .vendors
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(vendors
            .get(vendor_id)
            .filter(|item| item.tenant_id == ctx.tenant_id)
            .cloned())
    }

    async fn create_vendor(
        &self,
        ctx: &TenantContext,
        record: VendorRecord,
    ) -> Result<VendorRecord, StorageError> {
        ensure_tenant(ctx)?;
        if record.tenant_id != ctx.tenant_id {
            return Err(StorageError::new("tenant mismatch"));
        }
        let mut vendors = self
            .vendors
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        vendors.insert(record.vendor_id.clone(), record.clone());
        Ok(record)
    }

    async fn update_vendor(
        &self,
        ctx: &TenantContext,
        vendor_id: &str,
        update: VendorUpdate,
    ) -> Result<Option<VendorRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let mut vendors = self
            .vendors
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(record) = vendors
            .get_mut(vendor_id)
            .filter(|item| item.tenant_id == ctx.tenant_id)
        else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            record.name = name;
        }
        if let Some(contact) = update.contact {
            record.contact = Some(contact);
        }
        Ok(Some(record.clone()))
    }

    async fn delete_vendor(
        &self,
        ctx: &TenantContext,
        vendor_id: &str,
    ) -> Result<bool, StorageError> {
        ensure_tenant(ctx)?;
        let mut vendors = self
            .vendors
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let owned = vendors
            .get(vendor_id)
            .map(|item| item.tenant_id == ctx.tenant_id)
            .unwrap_or(false);
        if !owned {
            return Ok(false);
        }
        vendors.remove(vendor_id);
        Ok(true)
    }
}
