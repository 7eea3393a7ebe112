//! 套餐 handlers
//!
//! - GET/POST /plans
//! - GET /plans/{code}

use crate::AppState;
use crate::middleware::{require_permission, require_tenant_context};
use crate::utils::response::{limits_from_dto, not_found_error, plan_to_dto, storage_error};
use crate::utils::validation::normalize_required;
use api_contract::{ApiResponse, CreatePlanRequest, PlanDto};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::permissions;
use vls_storage::{PlanRecord, PlanStore};

#[derive(serde::Deserialize)]
pub struct PlanPath {
    plan_code: String,
}

/// 列出套餐目录
pub async fn list_plans(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::TENANT_PLAN_READ) {
        return response;
    }
    match state.plan_store.list_plans().await {
        Ok(items) => {
            let data: Vec<PlanDto> = items.into_iter().map(plan_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 创建套餐（限额非负，0 表示该类型直接禁止）
pub async fn create_plan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreatePlanRequest>,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::TENANT_PLAN_WRITE) {
        return response;
    }
    let plan_code = match normalize_required(req.plan_code, "planCode") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let name = match normalize_required(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let record = PlanRecord {
        plan_code,
        name,
        limits: limits_from_dto(req.limits),
    };
    match state.plan_store.create_plan(record).await {
        Ok(item) => {
            (StatusCode::OK, Json(ApiResponse::success(plan_to_dto(item)))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 获取套餐详情
pub async fn get_plan(
    State(state): State<AppState>,
    Path(path): Path<PlanPath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::TENANT_PLAN_READ) {
        return response;
    }
    match state.plan_store.find_plan(&path.plan_code).await {
        Ok(Some(item)) => {
            (StatusCode::OK, Json(ApiResponse::success(plan_to_dto(item)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}
