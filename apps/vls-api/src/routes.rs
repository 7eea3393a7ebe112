//! 路由定义
//!
//! 集中管理所有 API 路由，将路径映射到对应的 handlers。
//! 路由包括：
//! - 健康检查：/health
//! - 认证接口：/login, /refresh-token
//! - 客户管理：/clients/*（含换套餐与停用级联）
//! - 套餐目录：/plans/*
//! - 站点管理：/sites/*
//! - 承运商管理：/vendors/*
//! - 设备管理：/devices/*（启停走配额门控）
//! - 员工管理：/users
//! - 行程台账：/sites/{id}/trips/*
//! - 闸机控制：/barrier/*
//! - 审计与指标：/audit-logs, /metrics

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

/// 创建 API 路由
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/clients", get(list_clients).post(create_client))
        .route("/clients/:client_id", get(get_client).put(update_client))
        .route("/clients/:client_id/plan", axum::routing::put(change_client_plan))
        .route("/clients/:client_id/deactivate", post(deactivate_client))
        .route("/plans", get(list_plans).post(create_plan))
        .route("/plans/:plan_code", get(get_plan))
        .route("/sites", get(list_sites).post(create_site))
        .route(
            "/sites/:site_id",
            get(get_site).put(update_site).delete(delete_site),
        )
        .route("/vendors", get(list_vendors).post(create_vendor))
        .route(
            "/vendors/:vendor_id",
            get(get_vendor).put(update_vendor).delete(delete_vendor),
        )
        .route("/devices", get(list_devices).post(create_device))
        .route(
            "/devices/:device_id",
            get(get_device).put(update_device).delete(delete_device),
        )
        .route("/devices/:device_id/enable", post(enable_device))
        .route("/devices/:device_id/disable", post(disable_device))
        .route("/devices/:device_id/heartbeat", post(device_heartbeat))
        .route("/users", post(create_user))
        .route("/sites/:site_id/trips", get(list_trips).post(open_trip))
        .route("/sites/:site_id/trips/:trip_id", get(get_trip))
        .route("/sites/:site_id/trips/:trip_id/close", post(close_trip))
        .route("/barrier/login", post(barrier_login))
        .route("/barrier/open", post(barrier_open))
        .route("/audit-logs", get(list_audit_logs))
        .route("/metrics", get(get_metrics))
}
