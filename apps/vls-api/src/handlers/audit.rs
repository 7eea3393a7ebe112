//! 审计日志 handlers
//!
//! - GET /audit-logs

use crate::AppState;
use crate::middleware::{require_permission, require_tenant_context};
use crate::utils::response::{audit_log_to_dto, storage_error};
use api_contract::{ApiResponse, AuditLogDto, AuditQuery};
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::permissions;
use vls_storage::AuditLogStore;

/// 查询审计日志
///
/// 查询参数：
///   - fromMs / toMs：可选，时间窗（毫秒）
///   - limit：可选，返回数量限制（默认 100）
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::AUDIT_READ) {
        return response;
    }
    let limit = query.limit.unwrap_or(100).max(0);
    match state
        .audit_log_store
        .list_audit_logs(&ctx, query.from_ms, query.to_ms, limit)
        .await
    {
        Ok(items) => {
            let data: Vec<AuditLogDto> = items.into_iter().map(audit_log_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}
