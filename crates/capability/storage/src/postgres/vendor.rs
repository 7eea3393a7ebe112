//! Postgres 承运商存储实现

use crate::error::StorageError;
use crate::models::{VendorRecord, VendorUpdate};
use crate::traits::VendorStore;
use crate::validation::ensure_tenant;
use domain::TenantContext;
use sqlx::{PgPool, Row};

pub struct PgVendorStore {
    pub pool: PgPool,
}

impl PgVendorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn vendor_from_row(row: &sqlx::postgres::PgRow) -> Result<VendorRecord, StorageError> {
    Ok(VendorRecord {
        vendor_id: row.try_get("vendor_id")?,
        tenant_id: row.try_get("tenant_id")?,
        name: row.try_get("name")?,
        contact: row.try_get("contact")?,
    })
}

#[async_trait::async_trait]
impl VendorStore for PgVendorStore {
    async fn list_vendors(&self, ctx: &TenantContext) -> Result<Vec<VendorRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let rows = sqlx::query(
            "select vendor_id, tenant_id, name, contact \
             from vendors where tenant_id = $1 order by vendor_id",
        )
        .bind(&ctx.tenant_id)
        .fetch_all(&self.pool)
        .await?;
        let mut vendors = Vec::with_capacity(rows.len());
        for row in rows {
            vendors.push(vendor_from_row(&row)?);
        }
        Ok(vendors)
    }

    async fn find_vendor(
        &self,
        ctx: &TenantContext,
        vendor_id: &str,
    ) -> Result<Option<VendorRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let row = sqlx::query(
            "select vendor_id, tenant_id, name, contact \
             from vendors where tenant_id = $1 and vendor_id = $2",
        )
        .bind(&ctx.tenant_id)
        .bind(vendor_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(vendor_from_row(&row)?))
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
        sqlx::query(
            "insert into vendors (vendor_id, tenant_id, name, contact) values ($1, $2, $3, $4)",
        )
        .bind(&record.vendor_id)
        .bind(&record.tenant_id)
        .bind(&record.name)
        .bind(&record.contact)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn update_vendor(
        &self,
        ctx: &TenantContext,
        vendor_id: &str,
        update: VendorUpdate,
    ) -> Result<Option<VendorRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let row = sqlx::query(
            "update vendors set name = coalesce($3, name), contact = coalesce($4, contact) \
             where tenant_id = $1 and vendor_id = $2 \
             returning vendor_id, tenant_id, name, contact",
        )
        .bind(&ctx.tenant_id)
        .bind(vendor_id)
        .bind(update.name)
        .bind(update.contact)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(vendor_from_row(&row)?))
    }

    async fn delete_vendor(
        &self,
        ctx: &TenantContext,
        vendor_id: &str,
    ) -> Result<bool, StorageError> {
        ensure_tenant(ctx)?;
        let result = sqlx::query("delete from vendors where tenant_id = $1 and vendor_id = $2")
            .bind(&ctx.tenant_id)
            .bind(vendor_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
