//! 闸机控制 handlers
//!
//! - POST /barrier/login - 对 Agent 做登录握手
//! - POST /barrier/open - 开闸
//!
//! 控制器本身不做持久化；每次尝试（成功或失败）都在这里审计。
//! Agent 链路错误不自动重试，由调用方决定是否重发。

use crate::AppState;
use crate::middleware::{require_permission, require_tenant_context};
use crate::utils::response::control_error;
use api_contract::{ApiResponse, BarrierCommandDto};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::permissions;
use vls_storage::AuditEvent;

/// Agent 登录握手
pub async fn barrier_login(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::CONTROL_BARRIER) {
        return response;
    }
    let result = state.barrier.authenticate_agent().await;
    let outcome = match &result {
        Ok(()) => "ok".to_string(),
        Err(err) => err.to_string(),
    };
    state
        .audit
        .record(
            &ctx,
            AuditEvent::new("CONTROL.BARRIER.LOGIN", "barrier").with_new(serde_json::json!({
                "result": outcome,
            })),
        )
        .await;
    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(BarrierCommandDto {
                action: "LOGIN_BARRIER".to_string(),
                status: "ok".to_string(),
            })),
        )
            .into_response(),
        Err(err) => control_error(err),
    }
}

/// 开闸
pub async fn barrier_open(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::CONTROL_BARRIER) {
        return response;
    }
    let result = state.barrier.actuate_barrier().await;
    let outcome = match &result {
        Ok(()) => "opened".to_string(),
        Err(err) => err.to_string(),
    };
    state
        .audit
        .record(
            &ctx,
            AuditEvent::new("CONTROL.BARRIER.OPEN", "barrier").with_new(serde_json::json!({
                "result": outcome,
            })),
        )
        .await;
    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(BarrierCommandDto {
                action: "OPEN_BARRIER".to_string(),
                status: "opened".to_string(),
            })),
        )
            .into_response(),
        Err(err) => control_error(err),
    }
}
