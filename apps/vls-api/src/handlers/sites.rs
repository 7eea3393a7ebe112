//! 站点 handlers
//!
//! - GET/POST /sites
//! - GET/PUT/DELETE /sites/{id}

use crate::AppState;
use crate::middleware::{require_permission, require_tenant_context};
use crate::utils::response::{bad_request_error, not_found_error, site_to_dto, storage_error};
use crate::utils::{normalize_optional, normalize_required};
use api_contract::{ApiResponse, CreateSiteRequest, SiteDto, UpdateSiteRequest};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::permissions;
use uuid::Uuid;
use vls_storage::{SiteRecord, SiteStore, SiteUpdate};

#[derive(serde::Deserialize)]
pub struct SitePath {
    site_id: String,
}

/// 列出站点
pub async fn list_sites(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_SITE_READ) {
        return response;
    }
    match state.site_store.list_sites(&ctx).await {
        Ok(items) => {
            let data: Vec<SiteDto> = items.into_iter().map(site_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 创建站点
pub async fn create_site(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateSiteRequest>,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_SITE_WRITE) {
        return response;
    }
    let name = match normalize_required(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let record = SiteRecord {
        site_id: Uuid::new_v4().to_string(),
        tenant_id: ctx.tenant_id.clone(),
        name,
        address: req.address,
    };
    match state.site_store.create_site(&ctx, record).await {
        Ok(item) => {
            (StatusCode::OK, Json(ApiResponse::success(site_to_dto(item)))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 获取站点详情
pub async fn get_site(
    State(state): State<AppState>,
    Path(path): Path<SitePath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_SITE_READ) {
        return response;
    }
    match state.site_store.find_site(&ctx, &path.site_id).await {
        Ok(Some(item)) => {
            (StatusCode::OK, Json(ApiResponse::success(site_to_dto(item)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 更新站点
pub async fn update_site(
    State(state): State<AppState>,
    Path(path): Path<SitePath>,
    headers: HeaderMap,
    Json(req): Json<UpdateSiteRequest>,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_SITE_WRITE) {
        return response;
    }
    let name = match normalize_optional(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let address = match normalize_optional(req.address, "address") {
        Ok(value) => value,
        Err(response) => return response,
    };
    if name.is_none() && address.is_none() {
        return bad_request_error("empty update");
    }
    match state
        .site_store
        .update_site(&ctx, &path.site_id, SiteUpdate { name, address })
        .await
    {
        Ok(Some(item)) => {
            (StatusCode::OK, Json(ApiResponse::success(site_to_dto(item)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 删除站点
pub async fn delete_site(
    State(state): State<AppState>,
    Path(path): Path<SitePath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_SITE_WRITE) {
        return response;
    }
    match state.site_store.delete_site(&ctx, &path.site_id).await {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::success(()))).into_response(),
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}
