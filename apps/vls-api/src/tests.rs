//! API 端到端测试（内存后端 + 内置种子）。

use crate::{AppState, middleware, routes, state};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::util::ServiceExt;
use vls_config::AppConfig;
use vls_storage::UserStore;

fn test_config() -> AppConfig {
    AppConfig {
        http_addr: "127.0.0.1:0".to_string(),
        database_url: None,
        redis_url: None,
        redis_online_ttl_seconds: 60,
        agent_listen_addr: "127.0.0.1:0".to_string(),
        agent_call_timeout_ms: 200,
        jwt_secret: "test-secret".to_string(),
        jwt_access_ttl_seconds: 3600,
        jwt_refresh_ttl_seconds: 7200,
        audit_retention_days: 90,
        audit_sweep_interval_seconds: 3600,
        audit_sweep_enabled: false,
    }
}

async fn test_app() -> (Router, AppState) {
    let state = state::build_state(&test_config()).await.expect("state");
    let app = routes::create_api_router()
        .with_state(state.clone())
        .layer(axum::middleware::from_fn(middleware::request_context));
    (app, state)
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/login",
        None,
        Some(serde_json::json!({ "username": "admin", "password": "admin123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["accessToken"]
        .as_str()
        .expect("access token")
        .to_string()
}

fn media(photos: usize) -> serde_json::Value {
    serde_json::json!({
        "challan": "challan.jpg",
        "photos": (0..photos).map(|i| format!("p{i}.jpg")).collect::<Vec<_>>(),
    })
}

async fn create_site(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/sites",
        Some(token),
        Some(serde_json::json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["siteId"].as_str().expect("site id").to_string()
}

async fn create_device(
    app: &Router,
    token: &str,
    name: &str,
    device_type: &str,
    site_id: &str,
) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/devices",
        Some(token),
        Some(serde_json::json!({
            "name": name,
            "deviceType": device_type,
            "siteId": site_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enabled"], false);
    body["data"]["deviceId"]
        .as_str()
        .expect("device id")
        .to_string()
}

#[tokio::test]
async fn health_is_open() {
    let (app, _) = test_app().await;
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn protected_routes_require_token() {
    let (app, _) = test_app().await;
    let (status, _) = send(&app, "GET", "/devices", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tenant_wide_barrier_cap_blocks_second_site() {
    let (app, _) = test_app().await;
    let token = login(&app).await;
    let site_a = create_site(&app, &token, "Site A").await;
    let site_b = create_site(&app, &token, "Site B").await;

    // basic 套餐 BARRIER 限 1
    let barrier_a = create_device(&app, &token, "barrier a", "BARRIER", &site_a).await;
    let barrier_b = create_device(&app, &token, "barrier b", "BARRIER", &site_b).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/devices/{barrier_a}/enable"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enabled"], true);

    // 租户级限额已满：site-b 为空也不得启用
    let (status, body) = send(
        &app,
        "POST",
        &format!("/devices/{barrier_b}/enable"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "QUOTA.TENANT_LIMIT");

    // 停用永远放行，随后名额释放
    let (status, _) = send(
        &app,
        "POST",
        &format!("/devices/{barrier_a}/disable"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        "POST",
        &format!("/devices/{barrier_b}/enable"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn zero_limit_type_is_forbidden_outright() {
    let (app, _) = test_app().await;
    let token = login(&app).await;
    let site = create_site(&app, &token, "Site A").await;
    let biometric = create_device(&app, &token, "face scanner", "BIOMETRIC", &site).await;
    let (status, body) = send(
        &app,
        "POST",
        &format!("/devices/{biometric}/enable"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "QUOTA.TYPE_NOT_ALLOWED");
}

#[tokio::test]
async fn trip_lifecycle_over_http() {
    let (app, _) = test_app().await;
    let token = login(&app).await;
    let site = create_site(&app, &token, "Site A").await;
    let (status, body) = send(
        &app,
        "POST",
        "/vendors",
        Some(&token),
        Some(serde_json::json!({ "name": "Vendor 1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let vendor_id = body["data"]["vendorId"].as_str().expect("vendor").to_string();

    // 入场：4 照片 + 磅单
    let (status, body) = send(
        &app,
        "POST",
        &format!("/sites/{site}/trips"),
        Some(&token),
        Some(serde_json::json!({
            "vendorId": vendor_id,
            "plateText": "MH12AB1234",
            "loadStatus": "LOADED",
            "entryMedia": media(4),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "INSIDE");
    let trip_id = body["data"]["tripId"].as_str().expect("trip").to_string();

    // 出场证据不足：拒绝且保持 INSIDE
    let (status, body) = send(
        &app,
        "POST",
        &format!("/sites/{site}/trips/{trip_id}/close"),
        Some(&token),
        Some(serde_json::json!({ "exitMedia": media(3) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "TRIP.MEDIA_INCOMPLETE");
    let (status, body) = send(
        &app,
        "GET",
        &format!("/sites/{site}/trips/{trip_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "INSIDE");

    // 补全证据关单
    let (status, body) = send(
        &app,
        "POST",
        &format!("/sites/{site}/trips/{trip_id}/close"),
        Some(&token),
        Some(serde_json::json!({ "exitMedia": media(4) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "EXITED");

    // 终态幂等拒绝
    let (status, body) = send(
        &app,
        "POST",
        &format!("/sites/{site}/trips/{trip_id}/close"),
        Some(&token),
        Some(serde_json::json!({ "exitMedia": media(5) })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "TRIP.ALREADY_CLOSED");
}

#[tokio::test]
async fn barrier_open_without_agent_is_offline() {
    let (app, _) = test_app().await;
    let token = login(&app).await;
    let (status, body) = send(&app, "POST", "/barrier/open", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "AGENT.OFFLINE");
}

#[tokio::test]
async fn audit_trail_records_trip_actions() {
    let (app, _) = test_app().await;
    let token = login(&app).await;
    let site = create_site(&app, &token, "Site A").await;
    let (_, body) = send(
        &app,
        "POST",
        "/vendors",
        Some(&token),
        Some(serde_json::json!({ "name": "Vendor 1" })),
    )
    .await;
    let vendor_id = body["data"]["vendorId"].as_str().expect("vendor").to_string();
    let (status, _) = send(
        &app,
        "POST",
        &format!("/sites/{site}/trips"),
        Some(&token),
        Some(serde_json::json!({
            "vendorId": vendor_id,
            "plateText": "KA01XY0001",
            "loadStatus": "EMPTY",
            "entryMedia": media(4),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/audit-logs", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = body["data"]
        .as_array()
        .expect("logs")
        .iter()
        .filter_map(|log| log["action"].as_str())
        .collect();
    assert!(actions.contains(&"TRIP.OPEN"));
}

#[tokio::test]
async fn deactivation_cascade_disables_devices_and_blocks_login() {
    let (app, state) = test_app().await;
    let token = login(&app).await;
    let site = create_site(&app, &token, "Site A").await;
    let barrier = create_device(&app, &token, "barrier", "BARRIER", &site).await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/devices/{barrier}/enable"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/clients/tenant-1/deactivate",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // 设备被级联停用
    let (status, body) = send(
        &app,
        "GET",
        &format!("/devices/{barrier}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enabled"], false);

    // refresh jti 已吊销
    let ctx = domain::TenantContext::new(
        "tenant-1",
        "user-1",
        vec![domain::Role::Admin],
        Vec::new(),
        None,
    );
    let jti = state
        .user_store
        .get_refresh_jti(&ctx, "user-1")
        .await
        .expect("query");
    assert!(jti.is_none());

    // 停用租户拒绝再登录
    let (status, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(serde_json::json!({ "username": "admin", "password": "admin123" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
