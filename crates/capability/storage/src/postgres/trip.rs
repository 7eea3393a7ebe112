//! Postgres 行程存储实现
//!
//! 设计要点：
//! - 证据包以 jsonb 存储，读取时反序列化为 MediaBundle
//! - close_trip 用 `status = 'inside'` 前置条件做一次性终态转移，
//!   并发关闭时恰有一条 UPDATE 生效

use crate::error::StorageError;
use crate::models::{TripExit, TripRecord};
use crate::traits::TripStore;
use crate::validation::{ensure_site_scope, ensure_tenant};
use domain::{LoadStatus, MediaBundle, TenantContext, TripStatus};
use sqlx::{PgPool, Row};

pub struct PgTripStore {
    pub pool: PgPool,
}

impl PgTripStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TRIP_COLUMNS: &str = "trip_id, tenant_id, site_id, vendor_id, plate_text, load_status, \
     status, entry_at_ms, entry_media::text as entry_media, exit_at_ms, \
     exit_media::text as exit_media, opened_by, closed_by";

fn media_to_json(media: &MediaBundle) -> Result<String, StorageError> {
    serde_json::to_string(media).map_err(|err| StorageError::new(err.to_string()))
}

fn media_from_json(text: &str) -> Result<MediaBundle, StorageError> {
    serde_json::from_str(text).map_err(|err| StorageError::new(err.to_string()))
}

fn trip_from_row(row: &sqlx::postgres::PgRow) -> Result<TripRecord, StorageError> {
    let load_status: String = row.try_get("load_status")?;
    let load_status = LoadStatus::from_db(&load_status)
        .ok_or_else(|| StorageError::new(format!("invalid load_status: {load_status}")))?;
    let status: String = row.try_get("status")?;
    let status = TripStatus::from_db(&status)
        .ok_or_else(|| StorageError::new(format!("invalid trip status: {status}")))?;
    let entry_media: String = row.try_get("entry_media")?;
    let exit_media: Option<String> = row.try_get("exit_media")?;
    Ok(TripRecord {
        trip_id: row.try_get("trip_id")?,
        tenant_id: row.try_get("tenant_id")?,
        site_id: row.try_get("site_id")?,
        vendor_id: row.try_get("vendor_id")?,
        plate_text: row.try_get("plate_text")?,
        load_status,
        status,
        entry_at_ms: row.try_get("entry_at_ms")?,
        entry_media: media_from_json(&entry_media)?,
        exit_at_ms: row.try_get("exit_at_ms")?,
        exit_media: exit_media.as_deref().map(media_from_json).transpose()?,
        opened_by: row.try_get("opened_by")?,
        closed_by: row.try_get("closed_by")?,
    })
}

#[async_trait::async_trait]
impl TripStore for PgTripStore {
    async fn create_trip(
        &self,
        ctx: &TenantContext,
        record: TripRecord,
    ) -> Result<TripRecord, StorageError> {
        ensure_site_scope(ctx, &record.site_id)?;
        if record.tenant_id != ctx.tenant_id {
            return Err(StorageError::new("tenant mismatch"));
        }
        sqlx::query(
            "insert into trips \
             (trip_id, tenant_id, site_id, vendor_id, plate_text, load_status, status, \
              entry_at_ms, entry_media, opened_by) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9::jsonb, $10)",
        )
        .bind(&record.trip_id)
        .bind(&record.tenant_id)
        .bind(&record.site_id)
        .bind(&record.vendor_id)
        .bind(&record.plate_text)
        .bind(record.load_status.as_db())
        .bind(record.status.as_db())
        .bind(record.entry_at_ms)
        .bind(media_to_json(&record.entry_media)?)
        .bind(&record.opened_by)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn find_trip(
        &self,
        ctx: &TenantContext,
        trip_id: &str,
    ) -> Result<Option<TripRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let row = sqlx::query(&format!(
            "select {TRIP_COLUMNS} from trips where tenant_id = $1 and trip_id = $2"
        ))
        .bind(&ctx.tenant_id)
        .bind(trip_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(trip_from_row(&row)?))
    }

    async fn find_trip_unscoped(&self, trip_id: &str) -> Result<Option<TripRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "select {TRIP_COLUMNS} from trips where trip_id = $1"
        ))
        .bind(trip_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(trip_from_row(&row)?))
    }

    async fn list_trips(
        &self,
        ctx: &TenantContext,
        site_id: &str,
        status: Option<TripStatus>,
        limit: i64,
    ) -> Result<Vec<TripRecord>, StorageError> {
        ensure_site_scope(ctx, site_id)?;
        let rows = sqlx::query(&format!(
            "select {TRIP_COLUMNS} from trips \
             where tenant_id = $1 and site_id = $2 \
             and ($3::text is null or status = $3) \
             order by entry_at_ms desc limit $4"
        ))
        .bind(&ctx.tenant_id)
        .bind(site_id)
        .bind(status.map(|value| value.as_db()))
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;
        let mut trips = Vec::with_capacity(rows.len());
        for row in rows {
            trips.push(trip_from_row(&row)?);
        }
        Ok(trips)
    }

    async fn close_trip(
        &self,
        ctx: &TenantContext,
        trip_id: &str,
        exit: TripExit,
    ) -> Result<bool, StorageError> {
        ensure_tenant(ctx)?;
        let result = sqlx::query(
            "update trips set status = 'exited', exit_at_ms = $3, \
             exit_media = $4::jsonb, closed_by = $5 \
             where tenant_id = $1 and trip_id = $2 and status = 'inside'",
        )
        .bind(&ctx.tenant_id)
        .bind(trip_id)
        .bind(exit.exit_at_ms)
        .bind(media_to_json(&exit.exit_media)?)
        .bind(&exit.closed_by)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
