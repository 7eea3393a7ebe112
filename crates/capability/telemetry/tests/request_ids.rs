use vls_telemetry::new_request_ids;

#[test]
fn request_ids_non_empty() {
    let ids = new_request_ids();
    assert!(!ids.request_id.is_empty());
    assert!(!ids.trace_id.is_empty());
}

#[test]
fn metrics_counters_accumulate() {
    vls_telemetry::record_trip_opened();
    vls_telemetry::record_trip_opened();
    vls_telemetry::record_quota_denied();
    let snapshot = vls_telemetry::metrics().snapshot();
    assert!(snapshot.trips_opened >= 2);
    assert!(snapshot.quota_denied >= 1);
}
