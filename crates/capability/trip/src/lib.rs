//! 行程能力：车辆进出台账状态机与证据校验。
//!
//! 状态机只有一条转移：INSIDE → EXITED，单向且只进一次。证据包在
//! 任何持久化之前校验；审计经 AuditSink 尽力追加，失败不回滚行程。

use domain::{LoadStatus, MediaBundle, TenantContext, TripStatus};
use std::sync::Arc;
use tracing::info;
use vls_storage::{AuditEvent, AuditSink, TripExit, TripRecord, TripStore, epoch_ms_now};
use vls_telemetry::{
    record_trip_close_conflict, record_trip_closed, record_trip_media_rejected,
    record_trip_opened,
};

/// 行程操作错误。
#[derive(Debug, thiserror::Error)]
pub enum TripError {
    #[error("incomplete media: {0}")]
    MediaIncomplete(domain::MediaError),
    #[error("trip not found")]
    NotFound,
    #[error("trip belongs to another tenant")]
    Forbidden,
    #[error("trip already closed")]
    AlreadyClosed,
    #[error("storage error: {0}")]
    Storage(String),
}

/// 开启行程（入场）的输入。
#[derive(Debug, Clone)]
pub struct OpenTrip {
    pub site_id: String,
    pub vendor_id: String,
    pub plate_text: String,
    pub load_status: LoadStatus,
    pub entry_media: MediaBundle,
}

/// 行程台账。
#[derive(Clone)]
pub struct TripLedger {
    trip_store: Arc<dyn TripStore>,
    audit: AuditSink,
}

impl TripLedger {
    pub fn new(trip_store: Arc<dyn TripStore>, audit: AuditSink) -> Self {
        Self { trip_store, audit }
    }

    /// 入场开单：证据合格才落库，初态 INSIDE，车牌从此不可变。
    pub async fn open_trip(
        &self,
        ctx: &TenantContext,
        open: OpenTrip,
    ) -> Result<TripRecord, TripError> {
        validate_media(&open.entry_media)?;
        let record = TripRecord {
            trip_id: uuid::Uuid::new_v4().to_string(),
            tenant_id: ctx.tenant_id.clone(),
            site_id: open.site_id,
            vendor_id: open.vendor_id,
            plate_text: open.plate_text,
            load_status: open.load_status,
            status: TripStatus::Inside,
            entry_at_ms: epoch_ms_now(),
            entry_media: open.entry_media,
            exit_at_ms: None,
            exit_media: None,
            opened_by: ctx.user_id.clone(),
            closed_by: None,
        };
        let record = self
            .trip_store
            .create_trip(ctx, record)
            .await
            .map_err(|err| TripError::Storage(err.to_string()))?;
        record_trip_opened();
        info!(
            target: "vls.trip",
            tenant_id = %record.tenant_id,
            site_id = %record.site_id,
            trip_id = %record.trip_id,
            plate = %record.plate_text,
            "trip_opened"
        );
        self.audit
            .record(
                ctx,
                AuditEvent::new("TRIP.OPEN", "trip").with_new(trip_snapshot(&record)),
            )
            .await;
        Ok(record)
    }

    /// 出场关单：条件转移，恰有一个并发关闭者胜出。
    ///
    /// 错误判定顺序：不存在 → 他租户 → 证据不全 → 已关闭。
    pub async fn close_trip(
        &self,
        ctx: &TenantContext,
        trip_id: &str,
        exit_media: MediaBundle,
    ) -> Result<TripRecord, TripError> {
        let existing = self
            .trip_store
            .find_trip_unscoped(trip_id)
            .await
            .map_err(|err| TripError::Storage(err.to_string()))?
            .ok_or(TripError::NotFound)?;
        if existing.tenant_id != ctx.tenant_id {
            return Err(TripError::Forbidden);
        }
        validate_media(&exit_media)?;
        if existing.status == TripStatus::Exited {
            return Err(TripError::AlreadyClosed);
        }

        let exit = TripExit {
            exit_media,
            exit_at_ms: epoch_ms_now(),
            closed_by: ctx.user_id.clone(),
        };
        let transitioned = self
            .trip_store
            .close_trip(ctx, trip_id, exit)
            .await
            .map_err(|err| TripError::Storage(err.to_string()))?;
        if !transitioned {
            // 并发关闭落败：对方已写入终态，本次不得覆盖出场证据
            record_trip_close_conflict();
            return Err(TripError::AlreadyClosed);
        }

        let updated = self
            .trip_store
            .find_trip(ctx, trip_id)
            .await
            .map_err(|err| TripError::Storage(err.to_string()))?
            .ok_or(TripError::NotFound)?;
        record_trip_closed();
        info!(
            target: "vls.trip",
            tenant_id = %updated.tenant_id,
            site_id = %updated.site_id,
            trip_id = %updated.trip_id,
            "trip_closed"
        );
        self.audit
            .record(
                ctx,
                AuditEvent::new("TRIP.CLOSE", "trip")
                    .with_old(trip_snapshot(&existing))
                    .with_new(trip_snapshot(&updated)),
            )
            .await;
        Ok(updated)
    }
}

fn validate_media(media: &MediaBundle) -> Result<(), TripError> {
    media.validate().map_err(|err| {
        record_trip_media_rejected();
        TripError::MediaIncomplete(err)
    })
}

/// 审计快照：记录状态机可见的关键字段。
fn trip_snapshot(record: &TripRecord) -> serde_json::Value {
    serde_json::json!({
        "tripId": record.trip_id,
        "siteId": record.site_id,
        "vendorId": record.vendor_id,
        "plateText": record.plate_text,
        "loadStatus": record.load_status.as_db(),
        "status": record.status.as_db(),
        "entryAtMs": record.entry_at_ms,
        "exitAtMs": record.exit_at_ms,
        "photoCount": record.entry_media.photos.len(),
    })
}
