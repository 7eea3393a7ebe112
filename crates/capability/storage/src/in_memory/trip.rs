//! 行程内存存储实现
//!
//! 仅用于本地演示和测试。
//!
//! 关键点：close_trip 在同一把写锁内完成"检查 INSIDE + 写出场数据"，
//! 并发关闭恰有一方成功。

use crate::error::StorageError;
use crate::models::{TripExit, TripRecord};
use crate::traits::TripStore;
use crate::validation::{ensure_site_scope, ensure_tenant};
use domain::{TenantContext, TripStatus};
use std::collections::HashMap;
use std::sync::RwLock;

/// 行程内存存储
pub struct InMemoryTripStore {
    trips: RwLock<HashMap<String, TripRecord>>,
}

impl InMemoryTripStore {
    pub fn new() -> Self {
        Self {
            trips: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl TripStore for InMemoryTripStore {
    async fn create_trip(
        &self,
        ctx: &TenantContext,
        record: TripRecord,
    ) -> Result<TripRecord, StorageError> {
        ensure_site_scope(ctx, &record.site_id)?;
        if record.tenant_id != ctx.tenant_id {
            return Err(StorageError::new("tenant mismatch"));
        }
        let mut trips = self
            .trips
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        trips.insert(record.trip_id.clone(), record.clone());
        Ok(record)
    }

    async fn find_trip(
        &self,
        ctx: &TenantContext,
        trip_id: &str,
    ) -> Result<Option<TripRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let trips = self
            .trips
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(trips
            .get(trip_id)
            .filter(|item| item.tenant_id == ctx.tenant_id)
            .cloned())
    }

    async fn find_trip_unscoped(&self, trip_id: &str) -> Result<Option<TripRecord>, StorageError> {
        let trips = self
            .trips
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(trips.get(trip_id).cloned())
    }

    async fn list_trips(
        &self,
        ctx: &TenantContext,
        site_id: &str,
        status: Option<TripStatus>,
        limit: i64,
    ) -> Result<Vec<TripRecord>, StorageError> {
        ensure_site_scope(ctx, site_id)?;
        let limit = limit.max(0) as usize;
        let trips = self
            .trips
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<TripRecord> = trips
            .values()
            .filter(|item| item.tenant_id == ctx.tenant_id && item.site_id == site_id)
            .filter(|item| match status {
                Some(status) => item.status == status,
                None => true,
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| b.entry_at_ms.cmp(&a.entry_at_ms));
        if limit > 0 && items.len() > limit {
            items.truncate(limit);
        }
        Ok(items)
    }

    async fn close_trip(
        &self,
        ctx: &TenantContext,
        trip_id: &str,
        exit: TripExit,
    ) -> Result<bool, StorageError> {
        ensure_tenant(ctx)?;
        let mut trips = self
            .trips
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(record) = trips
            .get_mut(trip_id)
            .filter(|item| item.tenant_id == ctx.tenant_id)
        else {
            return Ok(false);
        };
        if record.status != TripStatus::Inside {
            return Ok(false);
        }
        record.status = TripStatus::Exited;
        record.exit_at_ms = Some(exit.exit_at_ms);
        record.exit_media = Some(exit.exit_media);
        record.closed_by = Some(exit.closed_by);
        Ok(true)
    }
}
