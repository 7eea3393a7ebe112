//! 客户（租户）handlers
//!
//! - GET/POST /clients
//! - GET/PUT /clients/{id}
//! - PUT /clients/{id}/plan - 换套餐（限额快照原子改写）
//! - POST /clients/{id}/deactivate - 停用级联（设备停用 + 会话吊销）

use crate::AppState;
use crate::middleware::{require_permission, require_tenant_context};
use crate::utils::response::{
    bad_request_error, client_to_dto, limits_to_dto, not_found_error, storage_error,
};
use crate::utils::validation::normalize_required;
use api_contract::{
    ApiResponse, ChangePlanRequest, ClientDto, CreateClientRequest, UpdateClientRequest,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::permissions;
use uuid::Uuid;
use vls_storage::{
    AuditEvent, ClientRecord, ClientStore, ClientUpdate, OnlineStore, PlanStore,
    TenantLifecycleStore,
};

#[derive(serde::Deserialize)]
pub struct ClientPath {
    client_id: String,
}

/// 列出客户
pub async fn list_clients(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::TENANT_CLIENT_READ) {
        return response;
    }
    match state.client_store.list_clients().await {
        Ok(items) => {
            let data: Vec<ClientDto> = items.into_iter().map(client_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 创建客户：从套餐目录取限额做初始快照
pub async fn create_client(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateClientRequest>,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::TENANT_CLIENT_WRITE) {
        return response;
    }
    let name = match normalize_required(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let plan_code = match normalize_required(req.plan_code, "planCode") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let plan = match state.plan_store.find_plan(&plan_code).await {
        Ok(Some(plan)) => plan,
        Ok(None) => return bad_request_error("plan not found"),
        Err(err) => return storage_error(err),
    };
    let record = ClientRecord {
        client_id: Uuid::new_v4().to_string(),
        name,
        status: "active".to_string(),
        plan_code: plan.plan_code.clone(),
        limits: plan.limits,
    };
    match state.client_store.create_client(record).await {
        Ok(item) => {
            let dto = client_to_dto(item);
            state
                .audit
                .record(
                    &ctx,
                    AuditEvent::new("CLIENT.CREATE", "client").with_new(serde_json::json!({
                        "clientId": dto.client_id,
                        "name": dto.name,
                        "planCode": dto.plan_code,
                    })),
                )
                .await;
            (StatusCode::OK, Json(ApiResponse::success(dto))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 获取客户详情
pub async fn get_client(
    State(state): State<AppState>,
    Path(path): Path<ClientPath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::TENANT_CLIENT_READ) {
        return response;
    }
    match state.client_store.find_client(&path.client_id).await {
        Ok(Some(item)) => {
            (StatusCode::OK, Json(ApiResponse::success(client_to_dto(item)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 更新客户
pub async fn update_client(
    State(state): State<AppState>,
    Path(path): Path<ClientPath>,
    headers: HeaderMap,
    Json(req): Json<UpdateClientRequest>,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::TENANT_CLIENT_WRITE) {
        return response;
    }
    let name = match crate::utils::normalize_optional(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    if name.is_none() {
        return bad_request_error("empty update");
    }
    match state
        .client_store
        .update_client(&path.client_id, ClientUpdate { name })
        .await
    {
        Ok(Some(item)) => {
            (StatusCode::OK, Json(ApiResponse::success(client_to_dto(item)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 换套餐：plan_code 与限额快照一次写入；已启用设备不回收，
/// 新限额只约束之后的启用尝试
pub async fn change_client_plan(
    State(state): State<AppState>,
    Path(path): Path<ClientPath>,
    headers: HeaderMap,
    Json(req): Json<ChangePlanRequest>,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::TENANT_CLIENT_WRITE) {
        return response;
    }
    let plan_code = match normalize_required(req.plan_code, "planCode") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let plan = match state.plan_store.find_plan(&plan_code).await {
        Ok(Some(plan)) => plan,
        Ok(None) => return bad_request_error("plan not found"),
        Err(err) => return storage_error(err),
    };
    let previous = match state.client_store.find_client(&path.client_id).await {
        Ok(Some(item)) => item,
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    };
    match state
        .client_store
        .change_plan(&path.client_id, &plan.plan_code, plan.limits)
        .await
    {
        Ok(Some(item)) => {
            let dto = client_to_dto(item);
            state
                .audit
                .record(
                    &ctx,
                    AuditEvent::new("CLIENT.PLAN_CHANGE", "client")
                        .with_old(serde_json::json!({
                            "planCode": previous.plan_code,
                            "limits": limits_to_dto(previous.limits),
                        }))
                        .with_new(serde_json::json!({
                            "planCode": dto.plan_code,
                            "limits": dto.limits,
                        })),
                )
                .await;
            (StatusCode::OK, Json(ApiResponse::success(dto))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 停用客户：级联作为原子单元生效（全成或全不成），
/// 随后清掉该租户全部设备在线标记
pub async fn deactivate_client(
    State(state): State<AppState>,
    Path(path): Path<ClientPath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::TENANT_CLIENT_WRITE) {
        return response;
    }
    match state.lifecycle_store.deactivate_client(&path.client_id).await {
        Ok(true) => {}
        Ok(false) => return not_found_error(),
        Err(err) => return storage_error(err),
    }
    // 在线标记是缓存层数据，清理失败不影响级联结果
    if let Err(err) = state.online_store.clear_tenant(&path.client_id).await {
        tracing::warn!(
            target: "vls.api",
            client_id = %path.client_id,
            error = %err,
            "online_marks_clear_failed"
        );
    }
    state
        .audit
        .record(
            &ctx,
            AuditEvent::new("CLIENT.DEACTIVATE", "client").with_new(serde_json::json!({
                "clientId": path.client_id,
                "status": "inactive",
            })),
        )
        .await;
    (StatusCode::OK, Json(ApiResponse::success(()))).into_response()
}
