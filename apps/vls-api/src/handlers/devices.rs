//! 设备 CRUD 与启停 handlers
//!
//! 提供设备资源的增删改查与配额门控的启停接口：
//! - GET /devices - 列出设备（附在线状态）
//! - POST /devices - 创建设备（一律停用态，不走配额）
//! - GET /devices/{id} - 获取设备详情
//! - PUT /devices/{id} - 更新设备
//! - DELETE /devices/{id} - 删除设备
//! - POST /devices/{id}/enable - 启用设备（唯一受配额门控的操作）
//! - POST /devices/{id}/disable - 停用设备（永远放行）
//! - POST /devices/{id}/heartbeat - 设备心跳（刷新在线标记）
//!
//! 权限要求：
//! - 所有接口需要 Bearer token 认证
//! - 启停需 ASSET.DEVICE.ENABLE；增删改需 ASSET.DEVICE.WRITE
//! - 指定 site_id 时验证站点归属当前租户

use crate::AppState;
use crate::middleware::{require_permission, require_tenant_context};
use crate::utils::response::{
    bad_request_error, device_to_dto, not_found_error, quota_error, storage_error,
};
use crate::utils::{normalize_optional, normalize_required};
use api_contract::{ApiResponse, CreateDeviceRequest, DeviceDto, UpdateDeviceRequest};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::{DeviceType, permissions};
use uuid::Uuid;
use vls_storage::{
    AuditEvent, DeviceRecord, DeviceStore, DeviceUpdate, OnlineStore, SiteStore, epoch_ms_now,
};

#[derive(serde::Deserialize)]
pub struct DevicePath {
    device_id: String,
}

/// 列出设备
///
/// 查询当前租户的所有设备，并按 OnlineStore 的 last_seen 附加
/// 在线标记。
pub async fn list_devices(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_DEVICE_READ) {
        return response;
    }
    match state.device_store.list_devices(&ctx).await {
        Ok(items) => {
            let device_ids: Vec<String> =
                items.iter().map(|item| item.device_id.clone()).collect();
            let online = state
                .online_store
                .list_devices_last_seen_at_ms(&ctx, &device_ids)
                .await
                .unwrap_or_default();
            let data: Vec<DeviceDto> = items
                .into_iter()
                .map(|record| {
                    let mut dto = device_to_dto(record);
                    if let Some(ts_ms) = online.get(&dto.device_id).copied() {
                        dto.online = true;
                        dto.last_seen_at_ms = Some(ts_ms);
                    }
                    dto
                })
                .collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 创建设备
///
/// 设备一律以停用态创建——创建不受配额约束，只有启用才是配额
/// 门控的操作。指定 site_id 时验证站点归属当前租户。
pub async fn create_device(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateDeviceRequest>,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_DEVICE_WRITE) {
        return response;
    }
    let name = match normalize_required(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let Some(device_type) = DeviceType::from_db(&req.device_type.to_ascii_lowercase()) else {
        return bad_request_error("unknown deviceType");
    };
    if let Some(site_id) = req.site_id.as_deref() {
        match state.site_store.site_belongs_to_tenant(&ctx, site_id).await {
            Ok(true) => {}
            Ok(false) => return bad_request_error("site not found"),
            Err(err) => return storage_error(err),
        }
    }
    let record = DeviceRecord {
        device_id: Uuid::new_v4().to_string(),
        tenant_id: ctx.tenant_id.clone(),
        site_id: req.site_id,
        name,
        device_type,
        serial: req.serial,
        enabled: false,
    };
    match state.device_store.create_device(&ctx, record).await {
        Ok(item) => (
            StatusCode::OK,
            Json(ApiResponse::success(device_to_dto(item))),
        )
            .into_response(),
        Err(err) => storage_error(err),
    }
}

/// 获取设备详情
pub async fn get_device(
    State(state): State<AppState>,
    Path(path): Path<DevicePath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_DEVICE_READ) {
        return response;
    }
    match state.device_store.find_device(&ctx, &path.device_id).await {
        Ok(Some(item)) => {
            let last_seen_at_ms = state
                .online_store
                .get_device_last_seen_at_ms(&ctx, &path.device_id)
                .await
                .ok()
                .flatten();
            let mut dto = device_to_dto(item);
            if let Some(ts_ms) = last_seen_at_ms {
                dto.online = true;
                dto.last_seen_at_ms = Some(ts_ms);
            }
            (StatusCode::OK, Json(ApiResponse::success(dto))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 更新设备
pub async fn update_device(
    State(state): State<AppState>,
    Path(path): Path<DevicePath>,
    headers: HeaderMap,
    Json(req): Json<UpdateDeviceRequest>,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_DEVICE_WRITE) {
        return response;
    }
    let name = match normalize_optional(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let serial = match normalize_optional(req.serial, "serial") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let site_id = req.site_id;
    if name.is_none() && serial.is_none() && site_id.is_none() {
        return bad_request_error("empty update");
    }
    if let Some(site_id) = site_id.as_deref() {
        match state.site_store.site_belongs_to_tenant(&ctx, site_id).await {
            Ok(true) => {}
            Ok(false) => return bad_request_error("site not found"),
            Err(err) => return storage_error(err),
        }
    }
    let update = DeviceUpdate {
        name,
        site_id,
        serial,
    };
    match state
        .device_store
        .update_device(&ctx, &path.device_id, update)
        .await
    {
        Ok(Some(item)) => (
            StatusCode::OK,
            Json(ApiResponse::success(device_to_dto(item))),
        )
            .into_response(),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 删除设备
pub async fn delete_device(
    State(state): State<AppState>,
    Path(path): Path<DevicePath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_DEVICE_WRITE) {
        return response;
    }
    match state.device_store.delete_device(&ctx, &path.device_id).await {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::success(()))).into_response(),
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 启用设备
///
/// 走 QuotaEnforcer：同 (tenant, device_type) 的启用互相串行，
/// 租户级与站点级计数都要过同一套餐限额。
pub async fn enable_device(
    State(state): State<AppState>,
    Path(path): Path<DevicePath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_DEVICE_ENABLE) {
        return response;
    }
    match state.quota.enable_device(&ctx, &path.device_id).await {
        Ok(item) => {
            state
                .audit
                .record(
                    &ctx,
                    AuditEvent::new("QUOTA.DEVICE.ENABLE", "device")
                        .with_old(serde_json::json!({ "enabled": false }))
                        .with_new(serde_json::json!({
                            "deviceId": item.device_id,
                            "deviceType": item.device_type.as_db(),
                            "enabled": true,
                        })),
                )
                .await;
            (
                StatusCode::OK,
                Json(ApiResponse::success(device_to_dto(item))),
            )
                .into_response()
        }
        Err(err) => quota_error(err),
    }
}

/// 停用设备（不走配额）
pub async fn disable_device(
    State(state): State<AppState>,
    Path(path): Path<DevicePath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_DEVICE_ENABLE) {
        return response;
    }
    match state.quota.disable_device(&ctx, &path.device_id).await {
        Ok(item) => {
            state
                .audit
                .record(
                    &ctx,
                    AuditEvent::new("QUOTA.DEVICE.DISABLE", "device").with_new(
                        serde_json::json!({
                            "deviceId": item.device_id,
                            "enabled": false,
                        }),
                    ),
                )
                .await;
            (
                StatusCode::OK,
                Json(ApiResponse::success(device_to_dto(item))),
            )
                .into_response()
        }
        Err(err) => quota_error(err),
    }
}

/// 设备心跳：刷新在线标记（TTL 内判在线）
pub async fn device_heartbeat(
    State(state): State<AppState>,
    Path(path): Path<DevicePath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::ASSET_DEVICE_READ) {
        return response;
    }
    match state.device_store.find_device(&ctx, &path.device_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    }
    match state
        .online_store
        .touch_device(&ctx, &path.device_id, epoch_ms_now())
        .await
    {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::success(()))).into_response(),
        Err(err) => storage_error(err),
    }
}
