//! 存储接口 Trait 定义
//!
//! 定义所有资源存储的异步接口：
//! - PlanStore：套餐目录（平台级）
//! - ClientStore：客户（租户）存储
//! - SiteStore：站点存储
//! - VendorStore：承运商存储
//! - DeviceStore：设备存储（含启用计数与条件翻转）
//! - UserStore：用户存储
//! - TripStore：行程存储（含终态条件转移）
//! - AuditLogStore：审计日志存储（追加 + 留存删除）
//! - TenantLifecycleStore：租户停用级联（原子单元）
//!
//! 设计原则：
//! - 租户资源接口显式接收 TenantContext
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::models::{
    AuditLogRecord, ClientRecord, ClientUpdate, DeviceRecord, DeviceUpdate, PlanLimits,
    PlanRecord, SiteRecord, SiteUpdate, TripExit, TripRecord, UserRecord, VendorRecord,
    VendorUpdate,
};
use async_trait::async_trait;
use domain::{DeviceType, Role, TenantContext, TripStatus};

/// 套餐目录接口（平台级，无租户作用域）。
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn list_plans(&self) -> Result<Vec<PlanRecord>, StorageError>;

    async fn find_plan(&self, plan_code: &str) -> Result<Option<PlanRecord>, StorageError>;

    async fn create_plan(&self, record: PlanRecord) -> Result<PlanRecord, StorageError>;
}

/// 客户（租户）存储接口。
#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, StorageError>;

    async fn find_client(&self, client_id: &str) -> Result<Option<ClientRecord>, StorageError>;

    async fn create_client(&self, record: ClientRecord) -> Result<ClientRecord, StorageError>;

    async fn update_client(
        &self,
        client_id: &str,
        update: ClientUpdate,
    ) -> Result<Option<ClientRecord>, StorageError>;

    /// 换套餐：plan_code 与限额快照在同一次写入中改写。
    async fn change_plan(
        &self,
        client_id: &str,
        plan_code: &str,
        limits: PlanLimits,
    ) -> Result<Option<ClientRecord>, StorageError>;
}

/// 站点存储接口。
#[async_trait]
pub trait SiteStore: Send + Sync {
    async fn list_sites(&self, ctx: &TenantContext) -> Result<Vec<SiteRecord>, StorageError>;

    async fn find_site(
        &self,
        ctx: &TenantContext,
        site_id: &str,
    ) -> Result<Option<SiteRecord>, StorageError>;

    async fn create_site(
        &self,
        ctx: &TenantContext,
        record: SiteRecord,
    ) -> Result<SiteRecord, StorageError>;

    async fn update_site(
        &self,
        ctx: &TenantContext,
        site_id: &str,
        update: SiteUpdate,
    ) -> Result<Option<SiteRecord>, StorageError>;

    async fn delete_site(
        &self,
        ctx: &TenantContext,
        site_id: &str,
    ) -> Result<bool, StorageError>;

    /// 验证站点归属当前租户。
    async fn site_belongs_to_tenant(
        &self,
        ctx: &TenantContext,
        site_id: &str,
    ) -> Result<bool, StorageError>;
}

/// 承运商存储接口。
#[async_trait]
pub trait VendorStore: Send + Sync {
    async fn list_vendors(&self, ctx: &TenantContext) -> Result<Vec<VendorRecord>, StorageError>;

    async fn find_vendor(
        &self,
        ctx: &TenantContext,
        vendor_id: &str,
    ) -> Result<Option<VendorRecord>, StorageError>;

    async fn create_vendor(
        &self,
        ctx: &TenantContext,
        record: VendorRecord,
    ) -> Result<VendorRecord, StorageError>;

    async fn update_vendor(
        &self,
        ctx: &TenantContext,
        vendor_id: &str,
        update: VendorUpdate,
    ) -> Result<Option<VendorRecord>, StorageError>;

    async fn delete_vendor(
        &self,
        ctx: &TenantContext,
        vendor_id: &str,
    ) -> Result<bool, StorageError>;
}

/// 设备存储接口。
#[async_trait]
pub trait DeviceStore: Send + Sync {
    async fn list_devices(&self, ctx: &TenantContext) -> Result<Vec<DeviceRecord>, StorageError>;

    async fn find_device(
        &self,
        ctx: &TenantContext,
        device_id: &str,
    ) -> Result<Option<DeviceRecord>, StorageError>;

    async fn create_device(
        &self,
        ctx: &TenantContext,
        record: DeviceRecord,
    ) -> Result<DeviceRecord, StorageError>;

    async fn update_device(
        &self,
        ctx: &TenantContext,
        device_id: &str,
        update: DeviceUpdate,
    ) -> Result<Option<DeviceRecord>, StorageError>;

    async fn delete_device(
        &self,
        ctx: &TenantContext,
        device_id: &str,
    ) -> Result<bool, StorageError>;

    /// 统计租户内已启用的某类设备数；`exclude_device_id` 用于重评估
    /// 正在翻转的设备自身。
    async fn count_enabled_devices(
        &self,
        ctx: &TenantContext,
        device_type: DeviceType,
        exclude_device_id: Option<&str>,
    ) -> Result<i64, StorageError>;

    /// 统计指定站点内已启用的某类设备数。
    async fn count_enabled_devices_at_site(
        &self,
        ctx: &TenantContext,
        site_id: &str,
        device_type: DeviceType,
        exclude_device_id: Option<&str>,
    ) -> Result<i64, StorageError>;

    async fn set_device_enabled(
        &self,
        ctx: &TenantContext,
        device_id: &str,
        enabled: bool,
    ) -> Result<Option<DeviceRecord>, StorageError>;
}

/// 用户存储接口。
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 根据用户名查找用户（登录用，ctx 可为空租户）。
    async fn find_by_username(
        &self,
        ctx: &TenantContext,
        username: &str,
    ) -> Result<Option<UserRecord>, StorageError>;

    async fn find_user(
        &self,
        ctx: &TenantContext,
        user_id: &str,
    ) -> Result<Option<UserRecord>, StorageError>;

    async fn create_user(
        &self,
        ctx: &TenantContext,
        record: UserRecord,
    ) -> Result<UserRecord, StorageError>;

    /// 统计租户内某角色的用户数（套餐员工限额用）。
    async fn count_users_with_role(
        &self,
        ctx: &TenantContext,
        role: Role,
    ) -> Result<i64, StorageError>;

    async fn update_password_hash(
        &self,
        ctx: &TenantContext,
        user_id: &str,
        password_hash: &str,
    ) -> Result<bool, StorageError>;

    async fn get_refresh_jti(
        &self,
        ctx: &TenantContext,
        user_id: &str,
    ) -> Result<Option<String>, StorageError>;

    async fn set_refresh_jti(
        &self,
        ctx: &TenantContext,
        user_id: &str,
        refresh_jti: Option<&str>,
    ) -> Result<bool, StorageError>;
}

/// 行程存储接口。
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn create_trip(
        &self,
        ctx: &TenantContext,
        record: TripRecord,
    ) -> Result<TripRecord, StorageError>;

    async fn find_trip(
        &self,
        ctx: &TenantContext,
        trip_id: &str,
    ) -> Result<Option<TripRecord>, StorageError>;

    /// 按 ID 查找，不做租户过滤。
    ///
    /// 仅供行程台账区分"不存在"与"他租户资源"；其余路径一律走
    /// 租户过滤查询。
    async fn find_trip_unscoped(&self, trip_id: &str) -> Result<Option<TripRecord>, StorageError>;

    async fn list_trips(
        &self,
        ctx: &TenantContext,
        site_id: &str,
        status: Option<TripStatus>,
        limit: i64,
    ) -> Result<Vec<TripRecord>, StorageError>;

    /// 条件关闭：仅当状态仍为 INSIDE 时写入出场数据并转 EXITED。
    ///
    /// 返回 true 表示本次调用赢得转移；false 表示行程已是终态
    /// （并发关闭时恰有一方得到 false）。
    async fn close_trip(
        &self,
        ctx: &TenantContext,
        trip_id: &str,
        exit: TripExit,
    ) -> Result<bool, StorageError>;
}

/// 审计日志存储接口。
#[async_trait]
pub trait AuditLogStore: Send + Sync {
    async fn create_audit_log(
        &self,
        ctx: &TenantContext,
        record: AuditLogRecord,
    ) -> Result<AuditLogRecord, StorageError>;

    async fn list_audit_logs(
        &self,
        ctx: &TenantContext,
        from_ms: Option<i64>,
        to_ms: Option<i64>,
        limit: i64,
    ) -> Result<Vec<AuditLogRecord>, StorageError>;

    /// 删除早于 cutoff 的记录，返回删除条数（留存清理任务用，平台级）。
    async fn delete_audit_logs_before(&self, cutoff_ms: i64) -> Result<u64, StorageError>;
}

/// 租户停用级联接口。
///
/// 客户转 inactive、名下设备全部停用、全部用户 refresh jti 吊销，
/// 三步作为一个原子单元生效（全成或全不成）。
#[async_trait]
pub trait TenantLifecycleStore: Send + Sync {
    async fn deactivate_client(&self, client_id: &str) -> Result<bool, StorageError>;
}
