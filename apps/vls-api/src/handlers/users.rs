//! 用户（员工）handlers
//!
//! - POST /users - 创建员工（项目经理/主管受套餐名额约束）

use crate::AppState;
use crate::middleware::{require_permission, require_tenant_context};
use crate::utils::response::{bad_request_error, quota_error, storage_error};
use crate::utils::validation::normalize_required;
use api_contract::ApiResponse;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::{Role, permissions};
use uuid::Uuid;
use vls_storage::{UserRecord, UserStore};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub user_id: String,
    pub username: String,
    pub role: String,
    pub status: String,
}

/// 创建员工
///
/// 角色是封闭枚举；项目经理与主管创建前先过套餐名额检查。
pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateUserRequest>,
) -> Response {
    let ctx = match require_tenant_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_permission(&ctx, permissions::TENANT_CLIENT_WRITE) {
        return response;
    }
    let username = match normalize_required(req.username, "username") {
        Ok(value) => value,
        Err(response) => return response,
    };
    if req.password.trim().is_empty() {
        return bad_request_error("password required");
    }
    let Some(role) = Role::from_db(&req.role.to_ascii_lowercase()) else {
        return bad_request_error("unknown role");
    };
    if let Err(err) = state.quota.authorize_staff(&ctx, role).await {
        return quota_error(err);
    }
    let password = match vls_auth::hash_password(&req.password) {
        Ok(hash) => hash,
        Err(err) => return crate::utils::response::internal_auth_error(err),
    };
    let record = UserRecord {
        user_id: Uuid::new_v4().to_string(),
        tenant_id: ctx.tenant_id.clone(),
        username,
        password,
        role,
        status: "active".to_string(),
        permissions: permissions::defaults_for_role(role),
        refresh_jti: None,
    };
    match state.user_store.create_user(&ctx, record).await {
        Ok(item) => {
            let dto = UserDto {
                user_id: item.user_id,
                username: item.username,
                role: item.role.as_db().to_ascii_uppercase(),
                status: item.status,
            };
            (StatusCode::OK, Json(ApiResponse::success(dto))).into_response()
        }
        Err(err) => storage_error(err),
    }
}
