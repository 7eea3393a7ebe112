//! HTTP 响应辅助函数和 DTO 转换
//!
//! 提供统一的错误响应构造函数和 DTO 转换函数：
//! - 错误响应：auth_error, forbidden_error, bad_request_error, not_found_error,
//!   internal_auth_error, storage_error, quota_error, trip_error, control_error
//! - DTO 转换：client_to_dto, plan_to_dto, site_to_dto, vendor_to_dto,
//!   device_to_dto, trip_to_dto, audit_log_to_dto
//!
//! 设计原则：
//! - 所有错误返回统一的 ApiResponse 格式
//! - HTTP 状态码与错误码对应；Agent 链路错误映射到网关语义（502/504）

use api_contract::{
    ApiResponse, AuditLogDto, ClientDto, DeviceDto, MediaBundleDto, PlanDto, PlanLimitsDto,
    SiteDto, TripDto, VendorDto,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::MediaBundle;
use vls_auth::AuthError;
use vls_control::ControlError;
use vls_quota::QuotaError;
use vls_storage::{
    AuditLogRecord, ClientRecord, DeviceRecord, PlanLimits, PlanRecord, SiteRecord,
    StorageError, TripRecord, VendorRecord,
};
use vls_trip::TripError;

/// 认证错误响应
pub fn auth_error(status: StatusCode) -> Response {
    (
        status,
        Json(ApiResponse::<()>::error(
            "AUTH.UNAUTHORIZED",
            "unauthorized",
        )),
    )
        .into_response()
}

/// 禁止访问错误响应
pub fn forbidden_error() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ApiResponse::<()>::error("AUTH.FORBIDDEN", "forbidden")),
    )
        .into_response()
}

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 资源未找到错误响应
pub fn not_found_error() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", "not found")),
    )
        .into_response()
}

/// 认证内部错误响应
pub fn internal_auth_error(err: AuthError) -> Response {
    let message = err.to_string();
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message)),
    )
        .into_response()
}

/// 存储错误响应
pub fn storage_error(err: StorageError) -> Response {
    let message = err.to_string();
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message)),
    )
        .into_response()
}

/// 配额错误响应
pub fn quota_error(err: QuotaError) -> Response {
    let message = err.to_string();
    let (status, code) = match &err {
        QuotaError::DeviceTypeNotAllowed(_) => (StatusCode::FORBIDDEN, "QUOTA.TYPE_NOT_ALLOWED"),
        QuotaError::TenantLimitExceeded { .. } => (StatusCode::CONFLICT, "QUOTA.TENANT_LIMIT"),
        QuotaError::SiteLimitExceeded { .. } => (StatusCode::CONFLICT, "QUOTA.SITE_LIMIT"),
        QuotaError::StaffLimitExceeded { .. } => (StatusCode::CONFLICT, "QUOTA.STAFF_LIMIT"),
        QuotaError::TenantInactive => (StatusCode::FORBIDDEN, "QUOTA.TENANT_INACTIVE"),
        QuotaError::DeviceNotFound => (StatusCode::NOT_FOUND, "RESOURCE.NOT_FOUND"),
        QuotaError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL.ERROR"),
    };
    (status, Json(ApiResponse::<()>::error(code, message))).into_response()
}

/// 行程错误响应
pub fn trip_error(err: TripError) -> Response {
    let message = err.to_string();
    let (status, code) = match &err {
        TripError::MediaIncomplete(_) => (StatusCode::BAD_REQUEST, "TRIP.MEDIA_INCOMPLETE"),
        TripError::NotFound => (StatusCode::NOT_FOUND, "RESOURCE.NOT_FOUND"),
        TripError::Forbidden => (StatusCode::FORBIDDEN, "TRIP.FORBIDDEN"),
        TripError::AlreadyClosed => (StatusCode::CONFLICT, "TRIP.ALREADY_CLOSED"),
        TripError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL.ERROR"),
    };
    (status, Json(ApiResponse::<()>::error(code, message))).into_response()
}

/// 控制链路错误响应
pub fn control_error(err: ControlError) -> Response {
    let message = err.to_string();
    let (status, code) = match &err {
        ControlError::Agent(vls_agent::AgentError::Offline) => {
            (StatusCode::BAD_GATEWAY, "AGENT.OFFLINE")
        }
        ControlError::Agent(vls_agent::AgentError::Timeout) => {
            (StatusCode::GATEWAY_TIMEOUT, "AGENT.TIMEOUT")
        }
        ControlError::Agent(vls_agent::AgentError::Replaced) => {
            (StatusCode::BAD_GATEWAY, "AGENT.REPLACED")
        }
        ControlError::Agent(_) => (StatusCode::BAD_GATEWAY, "AGENT.TRANSPORT"),
        ControlError::Rejected(_) => (StatusCode::BAD_GATEWAY, "AGENT.REJECTED"),
    };
    (status, Json(ApiResponse::<()>::error(code, message))).into_response()
}

/// PlanLimits 转 PlanLimitsDto
pub fn limits_to_dto(limits: PlanLimits) -> PlanLimitsDto {
    PlanLimitsDto {
        max_project_managers: limits.max_project_managers,
        max_supervisors: limits.max_supervisors,
        max_anpr: limits.max_anpr,
        max_barrier: limits.max_barrier,
        max_biometric: limits.max_biometric,
    }
}

/// PlanLimitsDto 转 PlanLimits
pub fn limits_from_dto(dto: PlanLimitsDto) -> PlanLimits {
    PlanLimits {
        max_project_managers: dto.max_project_managers.max(0),
        max_supervisors: dto.max_supervisors.max(0),
        max_anpr: dto.max_anpr.max(0),
        max_barrier: dto.max_barrier.max(0),
        max_biometric: dto.max_biometric.max(0),
    }
}

/// PlanRecord 转 PlanDto
pub fn plan_to_dto(record: PlanRecord) -> PlanDto {
    PlanDto {
        plan_code: record.plan_code,
        name: record.name,
        limits: limits_to_dto(record.limits),
    }
}

/// ClientRecord 转 ClientDto
pub fn client_to_dto(record: ClientRecord) -> ClientDto {
    ClientDto {
        client_id: record.client_id,
        name: record.name,
        status: record.status,
        plan_code: record.plan_code,
        limits: limits_to_dto(record.limits),
    }
}

/// SiteRecord 转 SiteDto
pub fn site_to_dto(record: SiteRecord) -> SiteDto {
    SiteDto {
        site_id: record.site_id,
        name: record.name,
        address: record.address,
    }
}

/// VendorRecord 转 VendorDto
pub fn vendor_to_dto(record: VendorRecord) -> VendorDto {
    VendorDto {
        vendor_id: record.vendor_id,
        name: record.name,
        contact: record.contact,
    }
}

/// DeviceRecord 转 DeviceDto（在线状态由调用方按 OnlineStore 填充）
pub fn device_to_dto(record: DeviceRecord) -> DeviceDto {
    DeviceDto {
        device_id: record.device_id,
        site_id: record.site_id,
        name: record.name,
        device_type: record.device_type.as_db().to_ascii_uppercase(),
        serial: record.serial,
        enabled: record.enabled,
        online: false,
        last_seen_at_ms: None,
    }
}

/// MediaBundle 转 MediaBundleDto
pub fn media_to_dto(media: MediaBundle) -> MediaBundleDto {
    MediaBundleDto {
        challan: media.challan,
        photos: media.photos,
    }
}

/// MediaBundleDto 转 MediaBundle
pub fn media_from_dto(dto: MediaBundleDto) -> MediaBundle {
    MediaBundle {
        challan: dto.challan,
        photos: dto.photos,
    }
}

/// TripRecord 转 TripDto
pub fn trip_to_dto(record: TripRecord) -> TripDto {
    TripDto {
        trip_id: record.trip_id,
        site_id: record.site_id,
        vendor_id: record.vendor_id,
        plate_text: record.plate_text,
        load_status: record.load_status.as_db().to_ascii_uppercase(),
        status: record.status.as_db().to_ascii_uppercase(),
        entry_at_ms: record.entry_at_ms,
        entry_media: media_to_dto(record.entry_media),
        exit_at_ms: record.exit_at_ms,
        exit_media: record.exit_media.map(media_to_dto),
        opened_by: record.opened_by,
        closed_by: record.closed_by,
    }
}

/// AuditLogRecord 转 AuditLogDto
pub fn audit_log_to_dto(record: AuditLogRecord) -> AuditLogDto {
    AuditLogDto {
        audit_id: record.audit_id,
        actor: record.actor,
        role: record.role,
        action: record.action,
        module: record.module,
        old_value: record.old_value,
        new_value: record.new_value,
        origin: record.origin,
        ts_ms: record.ts_ms,
    }
}
