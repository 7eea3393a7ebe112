use domain::{LoadStatus, MediaBundle, Role, TenantContext, TripStatus};
use std::sync::Arc;
use vls_storage::{InMemoryTripStore, TripExit, TripRecord, TripStore};

fn ctx() -> TenantContext {
    TenantContext::new(
        "tenant-1",
        "user-1",
        vec![Role::Supervisor],
        Vec::new(),
        None,
    )
}

fn media() -> MediaBundle {
    MediaBundle {
        challan: "challan.jpg".to_string(),
        photos: vec![
            "p1.jpg".to_string(),
            "p2.jpg".to_string(),
            "p3.jpg".to_string(),
            "p4.jpg".to_string(),
        ],
    }
}

fn trip(trip_id: &str) -> TripRecord {
    TripRecord {
        trip_id: trip_id.to_string(),
        tenant_id: "tenant-1".to_string(),
        site_id: "site-a".to_string(),
        vendor_id: "vendor-1".to_string(),
        plate_text: "MH12AB1234".to_string(),
        load_status: LoadStatus::Loaded,
        status: TripStatus::Inside,
        entry_at_ms: 1_700_000_000_000,
        entry_media: media(),
        exit_at_ms: None,
        exit_media: None,
        opened_by: "user-1".to_string(),
        closed_by: None,
    }
}

fn exit(closed_by: &str) -> TripExit {
    TripExit {
        exit_media: media(),
        exit_at_ms: 1_700_000_100_000,
        closed_by: closed_by.to_string(),
    }
}

#[tokio::test]
async fn close_trip_transitions_once() {
    let store = InMemoryTripStore::new();
    let ctx = ctx();
    store.create_trip(&ctx, trip("trip-1")).await.expect("create");

    let first = store
        .close_trip(&ctx, "trip-1", exit("user-1"))
        .await
        .expect("close");
    assert!(first);

    let second = store
        .close_trip(&ctx, "trip-1", exit("user-2"))
        .await
        .expect("close");
    assert!(!second);

    let record = store
        .find_trip(&ctx, "trip-1")
        .await
        .expect("query")
        .expect("trip");
    assert_eq!(record.status, TripStatus::Exited);
    // 第二次关闭不得改写出场人与证据
    assert_eq!(record.closed_by.as_deref(), Some("user-1"));
}

#[tokio::test]
async fn concurrent_closes_admit_exactly_one() {
    let store = Arc::new(InMemoryTripStore::new());
    let ctx = ctx();
    store.create_trip(&ctx, trip("trip-1")).await.expect("create");

    let mut handles = Vec::new();
    for index in 0..8 {
        let store = Arc::clone(&store);
        let ctx = ctx.clone();
        handles.push(tokio::spawn(async move {
            store
                .close_trip(&ctx, "trip-1", exit(&format!("user-{index}")))
                .await
                .expect("close")
        }));
    }
    let mut winners = 0;
    for handle in handles {
        if handle.await.expect("join") {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn unscoped_lookup_sees_other_tenants() {
    let store = InMemoryTripStore::new();
    let ctx = ctx();
    store.create_trip(&ctx, trip("trip-1")).await.expect("create");

    let other = TenantContext::new("tenant-2", "user-9", vec![Role::Admin], Vec::new(), None);
    assert!(store
        .find_trip(&other, "trip-1")
        .await
        .expect("query")
        .is_none());
    assert!(store
        .find_trip_unscoped("trip-1")
        .await
        .expect("query")
        .is_some());
}

#[tokio::test]
async fn list_trips_filters_status_and_orders_desc() {
    let store = InMemoryTripStore::new();
    let ctx = ctx();
    let mut first = trip("trip-1");
    first.entry_at_ms = 1;
    let mut second = trip("trip-2");
    second.entry_at_ms = 2;
    store.create_trip(&ctx, first).await.expect("create");
    store.create_trip(&ctx, second).await.expect("create");
    store
        .close_trip(&ctx, "trip-1", exit("user-1"))
        .await
        .expect("close");

    let inside = store
        .list_trips(&ctx, "site-a", Some(TripStatus::Inside), 100)
        .await
        .expect("list");
    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].trip_id, "trip-2");

    let all = store
        .list_trips(&ctx, "site-a", None, 100)
        .await
        .expect("list");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].trip_id, "trip-2");
}
