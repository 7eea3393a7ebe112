use domain::{LoadStatus, MediaBundle, MediaError, Role, TenantContext, TripStatus};
use std::sync::Arc;
use vls_storage::{
    AuditLogRecord, AuditLogStore, AuditSink, InMemoryAuditLogStore, InMemoryTripStore,
    StorageError, TripStore,
};
use vls_trip::{OpenTrip, TripError, TripLedger};

fn ctx() -> TenantContext {
    TenantContext::new(
        "tenant-1",
        "supervisor-1",
        vec![Role::Supervisor],
        Vec::new(),
        None,
    )
}

fn media(photos: usize) -> MediaBundle {
    MediaBundle {
        challan: "challan.jpg".to_string(),
        photos: (0..photos).map(|i| format!("photo-{i}.jpg")).collect(),
    }
}

fn open(entry_photos: usize) -> OpenTrip {
    OpenTrip {
        site_id: "site-a".to_string(),
        vendor_id: "vendor-1".to_string(),
        plate_text: "MH12AB1234".to_string(),
        load_status: LoadStatus::Loaded,
        entry_media: media(entry_photos),
    }
}

fn ledger() -> (TripLedger, Arc<InMemoryTripStore>, Arc<InMemoryAuditLogStore>) {
    let trips = Arc::new(InMemoryTripStore::new());
    let audit_store = Arc::new(InMemoryAuditLogStore::new());
    let ledger = TripLedger::new(
        Arc::clone(&trips) as Arc<dyn TripStore>,
        AuditSink::new(Arc::clone(&audit_store) as Arc<dyn AuditLogStore>),
    );
    (ledger, trips, audit_store)
}

#[tokio::test]
async fn entry_exit_happy_path() {
    let (ledger, _, audit_store) = ledger();
    let trip = ledger.open_trip(&ctx(), open(4)).await.expect("open");
    assert_eq!(trip.status, TripStatus::Inside);
    assert!(trip.exit_at_ms.is_none());

    // 出场证据不足：拒绝且行程保持 INSIDE
    let result = ledger.close_trip(&ctx(), &trip.trip_id, media(3)).await;
    assert!(matches!(
        result,
        Err(TripError::MediaIncomplete(MediaError::TooFewPhotos { count: 3 }))
    ));

    // 补全证据后关单成功
    let closed = ledger
        .close_trip(&ctx(), &trip.trip_id, media(4))
        .await
        .expect("close");
    assert_eq!(closed.status, TripStatus::Exited);
    assert!(closed.exit_at_ms.is_some());
    assert_eq!(closed.closed_by.as_deref(), Some("supervisor-1"));

    let logs = audit_store
        .list_audit_logs(&ctx(), None, None, 10)
        .await
        .expect("logs");
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().any(|log| log.action == "TRIP.OPEN"));
    assert!(logs.iter().any(|log| log.action == "TRIP.CLOSE"));
}

#[tokio::test]
async fn open_rejects_incomplete_entry_media() {
    let (ledger, trips, _) = ledger();
    let result = ledger.open_trip(&ctx(), open(3)).await;
    assert!(matches!(result, Err(TripError::MediaIncomplete(_))));

    let mut bad_challan = open(4);
    bad_challan.entry_media.challan = "".to_string();
    let result = ledger.open_trip(&ctx(), bad_challan).await;
    assert!(matches!(
        result,
        Err(TripError::MediaIncomplete(MediaError::MissingChallan))
    ));

    // 拒绝发生在持久化之前
    let listed = trips
        .list_trips(&ctx(), "site-a", None, 10)
        .await
        .expect("list");
    assert!(listed.is_empty());
}

#[tokio::test]
async fn closing_twice_reports_already_closed_and_keeps_media() {
    let (ledger, trips, _) = ledger();
    let trip = ledger.open_trip(&ctx(), open(4)).await.expect("open");
    ledger
        .close_trip(&ctx(), &trip.trip_id, media(4))
        .await
        .expect("close");

    let mut second_media = media(5);
    second_media.challan = "second-challan.jpg".to_string();
    let result = ledger.close_trip(&ctx(), &trip.trip_id, second_media).await;
    assert!(matches!(result, Err(TripError::AlreadyClosed)));

    let record = trips
        .find_trip(&ctx(), &trip.trip_id)
        .await
        .expect("query")
        .expect("trip");
    let exit_media = record.exit_media.expect("exit media");
    assert_eq!(exit_media.challan, "challan.jpg");
    assert_eq!(exit_media.photos.len(), 4);
}

#[tokio::test]
async fn close_distinguishes_not_found_and_forbidden() {
    let (ledger, _, _) = ledger();
    let trip = ledger.open_trip(&ctx(), open(4)).await.expect("open");

    let result = ledger.close_trip(&ctx(), "trip-missing", media(4)).await;
    assert!(matches!(result, Err(TripError::NotFound)));

    let other = TenantContext::new(
        "tenant-2",
        "supervisor-9",
        vec![Role::Supervisor],
        Vec::new(),
        None,
    );
    let result = ledger.close_trip(&other, &trip.trip_id, media(4)).await;
    assert!(matches!(result, Err(TripError::Forbidden)));
}

#[tokio::test]
async fn concurrent_closes_admit_exactly_one() {
    let (ledger, _, _) = ledger();
    let trip = ledger.open_trip(&ctx(), open(4)).await.expect("open");
    let ledger = Arc::new(ledger);
    let mut handles = Vec::new();
    for _ in 0..8 {
        let ledger = Arc::clone(&ledger);
        let trip_id = trip.trip_id.clone();
        handles.push(tokio::spawn(async move {
            ledger.close_trip(&ctx(), &trip_id, media(4)).await
        }));
    }
    let mut closed = 0;
    let mut already_closed = 0;
    for handle in handles {
        match handle.await.expect("join") {
            Ok(_) => closed += 1,
            Err(TripError::AlreadyClosed) => already_closed += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(closed, 1);
    assert_eq!(already_closed, 7);
}

/// 永远失败的审计存储：验证审计失败不影响主操作。
struct FailingAuditStore;

#[async_trait::async_trait]
impl AuditLogStore for FailingAuditStore {
    async fn create_audit_log(
        &self,
        _ctx: &TenantContext,
        _record: AuditLogRecord,
    ) -> Result<AuditLogRecord, StorageError> {
        Err(StorageError::new("audit backend down"))
    }

    async fn list_audit_logs(
        &self,
        _ctx: &TenantContext,
        _from_ms: Option<i64>,
        _to_ms: Option<i64>,
        _limit: i64,
    ) -> Result<Vec<AuditLogRecord>, StorageError> {
        Ok(Vec::new())
    }

    async fn delete_audit_logs_before(&self, _cutoff_ms: i64) -> Result<u64, StorageError> {
        Ok(0)
    }
}

#[tokio::test]
async fn audit_failure_never_fails_the_trip() {
    let trips = Arc::new(InMemoryTripStore::new());
    let ledger = TripLedger::new(
        Arc::clone(&trips) as Arc<dyn TripStore>,
        AuditSink::new(Arc::new(FailingAuditStore)),
    );
    let trip = ledger.open_trip(&ctx(), open(4)).await.expect("open survives");
    let closed = ledger
        .close_trip(&ctx(), &trip.trip_id, media(4))
        .await
        .expect("close survives");
    assert_eq!(closed.status, TripStatus::Exited);
}
