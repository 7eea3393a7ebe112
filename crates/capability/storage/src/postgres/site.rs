//! Postgres 站点存储实现

use crate::error::StorageError;
use crate::models::{SiteRecord, SiteUpdate};
use crate::traits::SiteStore;
use crate::validation::ensure_tenant;
use domain::TenantContext;
use sqlx::{PgPool, Row};

pub struct PgSiteStore {
    pub pool: PgPool,
}

impl PgSiteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn site_from_row(row: &sqlx::postgres::PgRow) -> Result<SiteRecord, StorageError> {
    Ok(SiteRecord {
        site_id: row.try_get("site_id")?,
        tenant_id: row.try_get("tenant_id")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
    })
}

#[async_trait::async_trait]
impl SiteStore for PgSiteStore {
    async fn list_sites(&self, ctx: &TenantContext) -> Result<Vec<SiteRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let rows = sqlx::query(
            "select site_id, tenant_id, name, address \
             from sites where tenant_id = $1 order by site_id",
        )
        .bind(&ctx.tenant_id)
        .fetch_all(&self.pool)
        .await?;
        let mut sites = Vec::with_capacity(rows.len());
        for row in rows {
            sites.push(site_from_row(&row)?);
        }
        Ok(sites)
    }

    async fn find_site(
        &self,
        ctx: &TenantContext,
        site_id: &str,
    ) -> Result<Option<SiteRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let row = sqlx::query(
            "select site_id, tenant_id, name, address \
             from sites where tenant_id = $1 and site_id = $2",
        )
        .bind(&ctx.tenant_id)
        .bind(site_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(site_from_row(&row)?))
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
        sqlx::query(
            "insert into sites (site_id, tenant_id, name, address) values ($1, $2, $3, $4)",
        )
        .bind(&record.site_id)
        .bind(&record.tenant_id)
        .bind(&record.name)
        .bind(&record.address)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn update_site(
        &self,
        ctx: &TenantContext,
        site_id: &str,
        update: SiteUpdate,
    ) -> Result<Option<SiteRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let row = sqlx::query(
            "update sites set name = coalesce($3, name), address = coalesce($4, address) \
             where tenant_id = $1 and site_id = $2 \
             returning site_id, tenant_id, name, address",
        )
        .bind(&ctx.tenant_id)
        .bind(site_id)
        .bind(update.name)
        .bind(update.address)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(site_from_row(&row)?))
    }

    async fn delete_site(
        &self,
        ctx: &TenantContext,
        site_id: &str,
    ) -> Result<bool, StorageError> {
        ensure_tenant(ctx)?;
        let result = sqlx::query("delete from sites where tenant_id = $1 and site_id = $2")
            .bind(&ctx.tenant_id)
            .bind(site_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn site_belongs_to_tenant(
        &self,
        ctx: &TenantContext,
        site_id: &str,
    ) -> Result<bool, StorageError> {
        Ok(self.find_site(ctx, site_id).await?.is_some())
    }
}
