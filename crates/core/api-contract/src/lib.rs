//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 登录请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登录响应体。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires: u64,
    pub username: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

/// 刷新 token 请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[serde(alias = "refresh_token")]
    pub refresh_token: String,
}

/// 刷新 token 响应体。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires: u64,
}

/// 套餐限额结构（请求与返回共用）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimitsDto {
    pub max_project_managers: i64,
    pub max_supervisors: i64,
    pub max_anpr: i64,
    pub max_barrier: i64,
    pub max_biometric: i64,
}

/// 套餐创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    pub plan_code: String,
    pub name: String,
    pub limits: PlanLimitsDto,
}

/// 套餐返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDto {
    pub plan_code: String,
    pub name: String,
    pub limits: PlanLimitsDto,
}

/// 客户（租户）创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub name: String,
    pub plan_code: String,
}

/// 客户更新请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    pub name: Option<String>,
}

/// 客户换套餐请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePlanRequest {
    pub plan_code: String,
}

/// 客户返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDto {
    pub client_id: String,
    pub name: String,
    pub status: String,
    pub plan_code: String,
    pub limits: PlanLimitsDto,
}

/// 站点创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSiteRequest {
    pub name: String,
    pub address: Option<String>,
}

/// 站点更新请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSiteRequest {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// 站点返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDto {
    pub site_id: String,
    pub name: String,
    pub address: Option<String>,
}

/// 承运商创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendorRequest {
    pub name: String,
    pub contact: Option<String>,
}

/// 承运商更新请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVendorRequest {
    pub name: Option<String>,
    pub contact: Option<String>,
}

/// 承运商返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorDto {
    pub vendor_id: String,
    pub name: String,
    pub contact: Option<String>,
}

/// 设备创建请求体。设备创建时一律处于停用态，启用单独走配额门控。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeviceRequest {
    pub name: String,
    pub device_type: String,
    pub site_id: Option<String>,
    pub serial: Option<String>,
}

/// 设备更新请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeviceRequest {
    pub name: Option<String>,
    pub site_id: Option<String>,
    pub serial: Option<String>,
}

/// 设备返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDto {
    pub device_id: String,
    pub site_id: Option<String>,
    pub name: String,
    pub device_type: String,
    pub serial: Option<String>,
    pub enabled: bool,
    pub online: bool,
    pub last_seen_at_ms: Option<i64>,
}

/// 证据包结构（进出场共用）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaBundleDto {
    pub challan: String,
    pub photos: Vec<String>,
}

/// 行程开启（入场）请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenTripRequest {
    pub vendor_id: String,
    pub plate_text: String,
    pub load_status: String,
    pub entry_media: MediaBundleDto,
}

/// 行程关闭（出场）请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseTripRequest {
    pub exit_media: MediaBundleDto,
}

/// 行程返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDto {
    pub trip_id: String,
    pub site_id: String,
    pub vendor_id: String,
    pub plate_text: String,
    pub load_status: String,
    pub status: String,
    pub entry_at_ms: i64,
    pub entry_media: MediaBundleDto,
    pub exit_at_ms: Option<i64>,
    pub exit_media: Option<MediaBundleDto>,
    pub opened_by: String,
    pub closed_by: Option<String>,
}

/// 行程列表查询参数。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

/// 闸机命令返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarrierCommandDto {
    pub action: String,
    pub status: String,
}

/// Telemetry 指标快照返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub agent_sessions_opened: u64,
    pub agent_sessions_replaced: u64,
    pub commands_issued: u64,
    pub command_success: u64,
    pub command_rejected: u64,
    pub command_timeout: u64,
    pub command_offline: u64,
    pub command_latency_ms_total: u64,
    pub command_latency_ms_count: u64,
    pub trips_opened: u64,
    pub trips_closed: u64,
    pub trip_media_rejected: u64,
    pub trip_close_conflicts: u64,
    pub quota_admitted: u64,
    pub quota_denied: u64,
    pub audit_appended: u64,
    pub audit_append_failures: u64,
    pub retention_deleted: u64,
}

/// 审计日志查询参数。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    pub from_ms: Option<i64>,
    pub to_ms: Option<i64>,
    pub limit: Option<i64>,
}

/// 审计日志返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogDto {
    pub audit_id: String,
    pub actor: String,
    pub role: String,
    pub action: String,
    pub module: String,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub origin: Option<String>,
    pub ts_ms: i64,
}
