//! 行程 handlers
//!
//! - GET/POST /sites/{id}/trips
//! - GET /sites/{id}/trips/{tid}
//! - POST /sites/{id}/trips/{tid}/close
//!
//! 入场/出场的状态机与证据校验在 TripLedger 内；这里只做站点
//! 归属、承运商存在性与载重状态解析。

use crate::AppState;
use crate::middleware::{require_permission, require_site_scope};
use crate::utils::response::{
    bad_request_error, media_from_dto, not_found_error, storage_error, trip_error, trip_to_dto,
};
use crate::utils::validation::normalize_required;
use api_contract::{ApiResponse, CloseTripRequest, OpenTripRequest, TripDto, TripQuery};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::{LoadStatus, TripStatus, permissions};
use vls_storage::{TripStore, VendorStore};
use vls_trip::OpenTrip;

#[derive(serde::Deserialize)]
pub struct SitePath {
    site_id: String,
}

#[derive(serde::Deserialize)]
pub struct TripPath {
    site_id: String,
    trip_id: String,
}

/// 列出站点行程
pub async fn list_trips(
    State(state): State<AppState>,
    Path(path): Path<SitePath>,
    Query(query): Query<TripQuery>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_site_scope(&state, &headers, &path.site_id).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::TRIP_READ) {
        return response;
    }
    let status = match query.status.as_deref() {
        None => None,
        Some(value) => match TripStatus::from_db(&value.to_ascii_lowercase()) {
            Some(status) => Some(status),
            None => return bad_request_error("unknown status"),
        },
    };
    let limit = query.limit.unwrap_or(100).max(0);
    match state
        .trip_store
        .list_trips(&ctx, &path.site_id, status, limit)
        .await
    {
        Ok(items) => {
            let data: Vec<TripDto> = items.into_iter().map(trip_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 入场开单
pub async fn open_trip(
    State(state): State<AppState>,
    Path(path): Path<SitePath>,
    headers: HeaderMap,
    Json(req): Json<OpenTripRequest>,
) -> Response {
    let ctx = match require_site_scope(&state, &headers, &path.site_id).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::TRIP_OPEN) {
        return response;
    }
    let vendor_id = match normalize_required(req.vendor_id, "vendorId") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let plate_text = match normalize_required(req.plate_text, "plateText") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let Some(load_status) = LoadStatus::from_db(&req.load_status.to_ascii_lowercase()) else {
        return bad_request_error("unknown loadStatus");
    };
    match state.vendor_store.find_vendor(&ctx, &vendor_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return bad_request_error("vendor not found"),
        Err(err) => return storage_error(err),
    }
    let open = OpenTrip {
        site_id: path.site_id,
        vendor_id,
        plate_text,
        load_status,
        entry_media: media_from_dto(req.entry_media),
    };
    match state.trips.open_trip(&ctx, open).await {
        Ok(item) => {
            (StatusCode::OK, Json(ApiResponse::success(trip_to_dto(item)))).into_response()
        }
        Err(err) => trip_error(err),
    }
}

/// 获取行程详情
pub async fn get_trip(
    State(state): State<AppState>,
    Path(path): Path<TripPath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_site_scope(&state, &headers, &path.site_id).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::TRIP_READ) {
        return response;
    }
    match state.trip_store.find_trip(&ctx, &path.trip_id).await {
        Ok(Some(item)) if item.site_id == path.site_id => {
            (StatusCode::OK, Json(ApiResponse::success(trip_to_dto(item)))).into_response()
        }
        Ok(_) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 出场关单：INSIDE → EXITED 单向一次
pub async fn close_trip(
    State(state): State<AppState>,
    Path(path): Path<TripPath>,
    headers: HeaderMap,
    Json(req): Json<CloseTripRequest>,
) -> Response {
    let ctx = match require_site_scope(&state, &headers, &path.site_id).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::TRIP_CLOSE) {
        return response;
    }
    match state
        .trips
        .close_trip(&ctx, &path.trip_id, media_from_dto(req.exit_media))
        .await
    {
        Ok(item) => {
            (StatusCode::OK, Json(ApiResponse::success(trip_to_dto(item)))).into_response()
        }
        Err(err) => trip_error(err),
    }
}
