//! Telemetry 指标快照（MVP）。
//!
//! - GET /metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use vls_telemetry::metrics;

use crate::{AppState, middleware::require_tenant_context};

pub async fn get_metrics(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(response) = require_tenant_context(&state, &headers) {
        return response;
    }

    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            agent_sessions_opened: snapshot.agent_sessions_opened,
            agent_sessions_replaced: snapshot.agent_sessions_replaced,
            commands_issued: snapshot.commands_issued,
            command_success: snapshot.command_success,
            command_rejected: snapshot.command_rejected,
            command_timeout: snapshot.command_timeout,
            command_offline: snapshot.command_offline,
            command_latency_ms_total: snapshot.command_latency_ms_total,
            command_latency_ms_count: snapshot.command_latency_ms_count,
            trips_opened: snapshot.trips_opened,
            trips_closed: snapshot.trips_closed,
            trip_media_rejected: snapshot.trip_media_rejected,
            trip_close_conflicts: snapshot.trip_close_conflicts,
            quota_admitted: snapshot.quota_admitted,
            quota_denied: snapshot.quota_denied,
            audit_appended: snapshot.audit_appended,
            audit_append_failures: snapshot.audit_append_failures,
            retention_deleted: snapshot.retention_deleted,
        })),
    )
        .into_response()
}
