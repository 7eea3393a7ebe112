//! 数据模型
//!
//! 定义所有存储相关的数据模型和更新结构：
//! - 套餐模型：PlanRecord, PlanLimits
//! - 客户模型：ClientRecord, ClientUpdate（租户本体，含限额快照）
//! - 站点模型：SiteRecord, SiteUpdate
//! - 承运商模型：VendorRecord, VendorUpdate
//! - 设备模型：DeviceRecord, DeviceUpdate（启用标志受配额门控）
//! - 用户模型：UserRecord
//! - 行程模型：TripRecord, TripExit（进出台账）
//! - 审计模型：AuditLogRecord

use domain::{DeviceType, LoadStatus, MediaBundle, Role, TenantContext, TripStatus};

/// 套餐限额。
///
/// 非负整数；0 表示该资源被直接禁止，区别于"尚未使用"。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLimits {
    pub max_project_managers: i64,
    pub max_supervisors: i64,
    pub max_anpr: i64,
    pub max_barrier: i64,
    pub max_biometric: i64,
}

impl PlanLimits {
    /// 指定设备类型的启用上限。
    pub fn device_limit_for(&self, device_type: DeviceType) -> i64 {
        match device_type {
            DeviceType::Anpr => self.max_anpr,
            DeviceType::Barrier => self.max_barrier,
            DeviceType::Biometric => self.max_biometric,
        }
    }

    /// 指定角色的员工数上限；管理员不设限。
    pub fn staff_limit_for(&self, role: Role) -> Option<i64> {
        match role {
            Role::Admin => None,
            Role::ProjectManager => Some(self.max_project_managers),
            Role::Supervisor => Some(self.max_supervisors),
        }
    }
}

/// 套餐记录（平台级目录）。
#[derive(Debug, Clone)]
pub struct PlanRecord {
    pub plan_code: String,
    pub name: String,
    pub limits: PlanLimits,
}

/// 客户（租户）记录。
///
/// `limits` 是当前套餐限额的快照，换套餐时与 `plan_code` 一次性改写。
#[derive(Debug, Clone)]
pub struct ClientRecord {
    pub client_id: String,
    pub name: String,
    /// active | inactive
    pub status: String,
    pub plan_code: String,
    pub limits: PlanLimits,
}

impl ClientRecord {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// 客户更新输入。
#[derive(Debug, Clone)]
pub struct ClientUpdate {
    pub name: Option<String>,
}

/// 站点记录。
#[derive(Debug, Clone)]
pub struct SiteRecord {
    pub site_id: String,
    pub tenant_id: String,
    pub name: String,
    pub address: Option<String>,
}

/// 站点更新输入。
#[derive(Debug, Clone)]
pub struct SiteUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// 承运商记录。
#[derive(Debug, Clone)]
pub struct VendorRecord {
    pub vendor_id: String,
    pub tenant_id: String,
    pub name: String,
    pub contact: Option<String>,
}

/// 承运商更新输入。
#[derive(Debug, Clone)]
pub struct VendorUpdate {
    pub name: Option<String>,
    pub contact: Option<String>,
}

/// 设备记录。
///
/// 设备归属租户，可选挂到站点；`enabled` 的翻转是唯一受配额
/// 门控的操作。在线状态由 OnlineStore 按 last_seen 推导，不落库。
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    pub device_id: String,
    pub tenant_id: String,
    pub site_id: Option<String>,
    pub name: String,
    pub device_type: DeviceType,
    pub serial: Option<String>,
    pub enabled: bool,
}

/// 设备更新输入。
#[derive(Debug, Clone)]
pub struct DeviceUpdate {
    pub name: Option<String>,
    pub site_id: Option<String>,
    pub serial: Option<String>,
}

/// 用户记录。
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: String,
    pub tenant_id: String,
    pub username: String,
    pub password: String,
    pub role: Role,
    /// active | disabled
    pub status: String,
    pub permissions: Vec<String>,
    /// 当前有效的 refresh token jti；吊销即置空。
    pub refresh_jti: Option<String>,
}

impl UserRecord {
    /// 将用户记录转换为 TenantContext。
    pub fn to_tenant_context(&self) -> TenantContext {
        TenantContext::new(
            self.tenant_id.clone(),
            self.user_id.clone(),
            vec![self.role],
            self.permissions.clone(),
            None,
        )
    }
}

/// 行程记录（一次车辆进出的完整台账）。
///
/// `plate_text` 入场后不可变；状态只允许 INSIDE → EXITED 单向一次。
#[derive(Debug, Clone)]
pub struct TripRecord {
    pub trip_id: String,
    pub tenant_id: String,
    pub site_id: String,
    pub vendor_id: String,
    pub plate_text: String,
    pub load_status: LoadStatus,
    pub status: TripStatus,
    pub entry_at_ms: i64,
    pub entry_media: MediaBundle,
    pub exit_at_ms: Option<i64>,
    pub exit_media: Option<MediaBundle>,
    pub opened_by: String,
    pub closed_by: Option<String>,
}

/// 行程出场写入（条件转移的载荷）。
#[derive(Debug, Clone)]
pub struct TripExit {
    pub exit_media: MediaBundle,
    pub exit_at_ms: i64,
    pub closed_by: String,
}

/// 审计日志记录。
///
/// 追加后不可变；仅留存清理任务会删除过期记录。
#[derive(Debug, Clone)]
pub struct AuditLogRecord {
    pub audit_id: String,
    pub tenant_id: String,
    pub actor: String,
    pub role: String,
    pub action: String,
    pub module: String,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub origin: Option<String>,
    pub ts_ms: i64,
}
