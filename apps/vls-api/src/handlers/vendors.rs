//! 承运商 handlers
//!
//! - GET/POST /vendors
//! - GET/PUT/DELETE /vendors/{id}

use crate::AppState;
use crate::middleware::{require_permission, require_tenant_context};
use crate::utils::response::{bad_request_error, not_found_error, storage_error, vendor_to_dto};
use crate::utils::{normalize_optional, normalize_required};
use api_contract::{ApiResponse, CreateVendorRequest, UpdateVendorRequest, VendorDto};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::permissions;
use uuid::Uuid;
use vls_storage::{VendorRecord, VendorStore, VendorUpdate};

#[derive(serde::Deserialize)]
pub struct VendorPath {
    vendor_id: String,
}

/// 列出承运商
pub async fn list_vendors(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_VENDOR_READ) {
        return response;
    }
    match state.vendor_store.list_vendors(&ctx).await {
        Ok(items) => {
            let data: Vec<VendorDto> = items.into_iter().map(vendor_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 创建承运商
pub async fn create_vendor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateVendorRequest>,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_VENDOR_WRITE) {
        return response;
    }
    let name = match normalize_required(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let record = VendorRecord {
        vendor_id: Uuid::new_v4().to_string(),
        tenant_id: ctx.tenant_id.clone(),
        name,
        contact: req.contact,
    };
    match state.vendor_store.create_vendor(&ctx, record).await {
        Ok(item) => {
            (StatusCode::OK, Json(ApiResponse::success(vendor_to_dto(item)))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 获取承运商详情
pub async fn get_vendor(
    State(state): State<AppState>,
    Path(path): Path<VendorPath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_VENDOR_READ) {
        return response;
    }
    match state.vendor_store.find_vendor(&ctx, &path.vendor_id).await {
        Ok(Some(item)) => {
            (StatusCode::OK, Json(ApiResponse::success(vendor_to_dto(item)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 更新承运商
pub async fn update_vendor(
    State(state): State<AppState>,
    Path(path): Path<VendorPath>,
    headers: HeaderMap,
    Json(req): Json<UpdateVendorRequest>,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_VENDOR_WRITE) {
        return response;
    }
    let name = match normalize_optional(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let contact = match normalize_optional(req.contact, "contact") {
        Ok(value) => value,
        Err(response) => return response,
    };
    if name.is_none() && contact.is_none() {
        return bad_request_error("empty update");
    }
    match state
        .vendor_store
        .update_vendor(&ctx, &path.vendor_id, VendorUpdate { name, contact })
        .await
    {
        Ok(Some(item)) => {
            (StatusCode::OK, Json(ApiResponse::success(vendor_to_dto(item)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 删除承运商
pub async fn delete_vendor(
    State(state): State<AppState>,
    Path(path): Path<VendorPath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_VENDOR_WRITE) {
        return response;
    }
    match state.vendor_store.delete_vendor(&ctx, &path.vendor_id).await {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::success(()))).into_response(),
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}
