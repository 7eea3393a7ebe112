//! 站点内存存储实现
//!
//! 仅用于本地演示和测试。
//!
//! 功能：
//! - 站点 CRUD 操作
//! - 租户隔离验证

use crate::error::StorageError;
use crate::models::{SiteRecord, SiteUpdate};
use crate::traits::SiteStore;
use crate::validation::ensure_tenant;
use domain::TenantContext;
use std::collections::HashMap;
use std::sync::RwLock;

/// 站点内存存储
pub struct InMemorySiteStore {
    sites: RwLock<HashMap<String, SiteRecord>>,
}

impl InMemorySiteStore {
    pub fn new() -> Self {
        Self {
            sites: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl SiteStore for InMemorySiteStore {
    async fn list_sites(&self, ctx: &TenantContext) -> Result<Vec<SiteRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let sites = self
            .sites
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<SiteRecord> = sites
            .values()
            .filter(|item| item.tenant_id == ctx.tenant_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.site_id.cmp(&b.site_id));
        Ok(items)
    }

    async fn find_site(
        &self,
        ctx: &TenantContext,
        site_id: &str,
    ) -> Result<Option<SiteRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let sites = self
            .sites
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(sites
            .get(site_id)
            .filter(|item| item.tenant_id == ctx.tenant_id)
            .cloned())
    }

    async fn create_site(
        &self,
        ctx: &TenantContext,
        record: SiteRecord,
    ) -> Result<SiteRecord, StorageError> {
        ensure_tenant(ctx)?;
        if record.tenant_id != ctx.tenant_id {
            return Err(StorageError::new("tenant mismatch"));
        }
        let mut sites = self
            .sites
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        sites.insert(record.site_id.clone(), record.clone());
        Ok(record)
    }

    async fn update_site(
        &self,
        ctx: &TenantContext,
        site_id: &str,
        update: SiteUpdate,
    ) -> Result<Option<SiteRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let mut sites = self
            .sites
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(record) = sites
            .get_mut(site_id)
            .filter(|item| item.tenant_id == ctx.tenant_id)
        else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            record.name = name;
        }
        if let Some(address) = update.address {
            record.address = Some(address);
        }
        Ok(Some(record.clone()))
    }

    async fn delete_site(
        &self,
        ctx: &TenantContext,
        site_id: &str,
    ) -> Result<bool, StorageError> {
        ensure_tenant(ctx)?;
        let mut sites = self
            .sites
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let owned = sites
            .get(site_id)
            .map(|item| item.tenant_id == ctx.tenant_id)
            .unwrap_or(false);
        if !owned {
            return Ok(false);
        }
        sites.remove(site_id);
        Ok(true)
    }

    async fn site_belongs_to_tenant(
        &self,
        ctx: &TenantContext,
        site_id: &str,
    ) -> Result<bool, StorageError> {
        Ok(self.find_site(ctx, site_id).await?.is_some())
    }
}
