//! Postgres 设备存储实现
//!
//! 设计要点：
//! - 所有操作都带租户过滤
//! - 启用计数在 SQL 侧完成（租户级 / 站点级，支持排除自身）

use crate::error::StorageError;
use crate::models::{DeviceRecord, DeviceUpdate};
use crate::traits::DeviceStore;
use crate::validation::ensure_tenant;
use domain::{DeviceType, TenantContext};
use sqlx::{PgPool, Row};

pub struct PgDeviceStore {
    pub pool: PgPool,
}

impl PgDeviceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const DEVICE_COLUMNS: &str =
    "device_id, tenant_id, site_id, name, device_type, serial, enabled";

fn device_from_row(row: &sqlx::postgres::PgRow) -> Result<DeviceRecord, StorageError> {
    let device_type: String = row.try_get("device_type")?;
    let device_type = DeviceType::from_db(&device_type)
        .ok_or_else(|| StorageError::new(format!("invalid device_type: {device_type}")))?;
    Ok(DeviceRecord {
        device_id: row.try_get("device_id")?,
        tenant_id: row.try_get("tenant_id")?,
        site_id: row.try_get("site_id")?,
        name: row.try_get("name")?,
        device_type,
        serial: row.try_get("serial")?,
        enabled: row.try_get("enabled")?,
    })
}

#[async_trait::async_trait]
impl DeviceStore for PgDeviceStore {
    async fn list_devices(&self, ctx: &TenantContext) -> Result<Vec<DeviceRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let rows = sqlx::query(&format!(
            "select {DEVICE_COLUMNS} from devices where tenant_id = $1 order by device_id"
        ))
        .bind(&ctx.tenant_id)
        .fetch_all(&self.pool)
        .await?;
        let mut devices = Vec::with_capacity(rows.len());
        for row in rows {
            devices.push(device_from_row(&row)?);
        }
        Ok(devices)
    }

    async fn find_device(
        &self,
        ctx: &TenantContext,
        device_id: &str,
    ) -> Result<Option<DeviceRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let row = sqlx::query(&format!(
            "select {DEVICE_COLUMNS} from devices where tenant_id = $1 and device_id = $2"
        ))
        .bind(&ctx.tenant_id)
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(device_from_row(&row)?))
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
        sqlx::query(
            "insert into devices \
             (device_id, tenant_id, site_id, name, device_type, serial, enabled) \
             values ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&record.device_id)
        .bind(&record.tenant_id)
        .bind(&record.site_id)
        .bind(&record.name)
        .bind(record.device_type.as_db())
        .bind(&record.serial)
        .bind(record.enabled)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn update_device(
        &self,
        ctx: &TenantContext,
        device_id: &str,
        update: DeviceUpdate,
    ) -> Result<Option<DeviceRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let row = sqlx::query(&format!(
            "update devices set name = coalesce($3, name), \
             site_id = coalesce($4, site_id), serial = coalesce($5, serial) \
             where tenant_id = $1 and device_id = $2 \
             returning {DEVICE_COLUMNS}"
        ))
        .bind(&ctx.tenant_id)
        .bind(device_id)
        .bind(update.name)
        .bind(update.site_id)
        .bind(update.serial)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(device_from_row(&row)?))
    }

    async fn delete_device(
        &self,
        ctx: &TenantContext,
        device_id: &str,
    ) -> Result<bool, StorageError> {
        ensure_tenant(ctx)?;
        let result = sqlx::query("delete from devices where tenant_id = $1 and device_id = $2")
            .bind(&ctx.tenant_id)
            .bind(device_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_enabled_devices(
        &self,
        ctx: &TenantContext,
        device_type: DeviceType,
        exclude_device_id: Option<&str>,
    ) -> Result<i64, StorageError> {
        ensure_tenant(ctx)?;
        let count: i64 = sqlx::query_scalar(
            "select count(*) from devices \
             where tenant_id = $1 and device_type = $2 and enabled \
             and ($3::text is null or device_id <> $3)",
        )
        .bind(&ctx.tenant_id)
        .bind(device_type.as_db())
        .bind(exclude_device_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count_enabled_devices_at_site(
        &self,
        ctx: &TenantContext,
        site_id: &str,
        device_type: DeviceType,
        exclude_device_id: Option<&str>,
    ) -> Result<i64, StorageError> {
        ensure_tenant(ctx)?;
        let count: i64 = sqlx::query_scalar(
            "select count(*) from devices \
             where tenant_id = $1 and site_id = $2 and device_type = $3 and enabled \
             and ($4::text is null or device_id <> $4)",
        )
        .bind(&ctx.tenant_id)
        .bind(site_id)
        .bind(device_type.as_db())
        .bind(exclude_device_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn set_device_enabled(
        &self,
        ctx: &TenantContext,
        device_id: &str,
        enabled: bool,
    ) -> Result<Option<DeviceRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let row = sqlx::query(&format!(
            "update devices set enabled = $3 \
             where tenant_id = $1 and device_id = $2 \
             returning {DEVICE_COLUMNS}"
        ))
        .bind(&ctx.tenant_id)
        .bind(device_id)
        .bind(enabled)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(device_from_row(&row)?))
    }
}
