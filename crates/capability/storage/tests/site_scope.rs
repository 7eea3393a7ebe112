use domain::{LoadStatus, MediaBundle, Role, TenantContext, TripStatus};
use vls_storage::{InMemoryTripStore, TripRecord, TripStore};

fn scoped_ctx(site_id: &str) -> TenantContext {
    TenantContext::new(
        "tenant-1",
        "user-1",
        vec![Role::Supervisor],
        Vec::new(),
        Some(site_id.to_string()),
    )
}

fn trip(site_id: &str) -> TripRecord {
    TripRecord {
        trip_id: "trip-1".to_string(),
        tenant_id: "tenant-1".to_string(),
        site_id: site_id.to_string(),
        vendor_id: "vendor-1".to_string(),
        plate_text: "KA01XY0001".to_string(),
        load_status: LoadStatus::Empty,
        status: TripStatus::Inside,
        entry_at_ms: 1_700_000_000_000,
        entry_media: MediaBundle {
            challan: "challan.jpg".to_string(),
            photos: vec!["p1".into(), "p2".into(), "p3".into(), "p4".into()],
        },
        exit_at_ms: None,
        exit_media: None,
        opened_by: "user-1".to_string(),
        closed_by: None,
    }
}

#[tokio::test]
async fn create_trip_rejects_out_of_scope_site() {
    let store = InMemoryTripStore::new();
    let ctx = scoped_ctx("site-a");
    let err = store.create_trip(&ctx, trip("site-b")).await;
    assert!(err.is_err());
}

#[tokio::test]
async fn list_trips_rejects_out_of_scope_site() {
    let store = InMemoryTripStore::new();
    let ctx = scoped_ctx("site-a");
    store.create_trip(&ctx, trip("site-a")).await.expect("create");
    assert!(store.list_trips(&ctx, "site-b", None, 10).await.is_err());
    assert_eq!(
        store
            .list_trips(&ctx, "site-a", None, 10)
            .await
            .expect("list")
            .len(),
        1
    );
}
