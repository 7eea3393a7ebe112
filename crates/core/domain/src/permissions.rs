//! 权限码常量
//!
//! 权限码为稳定字符串，JWT claims 与 handler 校验共用。

use crate::roles::Role;

pub const TENANT_CLIENT_READ: &str = "TENANT.CLIENT.READ";
pub const TENANT_CLIENT_WRITE: &str = "TENANT.CLIENT.WRITE";
pub const TENANT_PLAN_READ: &str = "TENANT.PLAN.READ";
pub const TENANT_PLAN_WRITE: &str = "TENANT.PLAN.WRITE";

pub const ASSET_SITE_READ: &str = "ASSET.SITE.READ";
pub const ASSET_SITE_WRITE: &str = "ASSET.SITE.WRITE";
pub const ASSET_VENDOR_READ: &str = "ASSET.VENDOR.READ";
pub const ASSET_VENDOR_WRITE: &str = "ASSET.VENDOR.WRITE";
pub const ASSET_DEVICE_READ: &str = "ASSET.DEVICE.READ";
pub const ASSET_DEVICE_WRITE: &str = "ASSET.DEVICE.WRITE";
pub const ASSET_DEVICE_ENABLE: &str = "ASSET.DEVICE.ENABLE";

pub const TRIP_READ: &str = "TRIP.READ";
pub const TRIP_OPEN: &str = "TRIP.OPEN";
pub const TRIP_CLOSE: &str = "TRIP.CLOSE";

pub const CONTROL_BARRIER: &str = "CONTROL.BARRIER";

pub const AUDIT_READ: &str = "AUDIT.READ";

/// 角色的默认权限集（种子数据与内存存储使用）。
pub fn defaults_for_role(role: Role) -> Vec<String> {
    let codes: &[&str] = match role {
        Role::Admin => &[
            TENANT_CLIENT_READ,
            TENANT_CLIENT_WRITE,
            TENANT_PLAN_READ,
            TENANT_PLAN_WRITE,
            ASSET_SITE_READ,
            ASSET_SITE_WRITE,
            ASSET_VENDOR_READ,
            ASSET_VENDOR_WRITE,
            ASSET_DEVICE_READ,
            ASSET_DEVICE_WRITE,
            ASSET_DEVICE_ENABLE,
            TRIP_READ,
            TRIP_OPEN,
            TRIP_CLOSE,
            CONTROL_BARRIER,
            AUDIT_READ,
        ],
        Role::ProjectManager => &[
            ASSET_SITE_READ,
            ASSET_VENDOR_READ,
            ASSET_VENDOR_WRITE,
            ASSET_DEVICE_READ,
            ASSET_DEVICE_WRITE,
            ASSET_DEVICE_ENABLE,
            TRIP_READ,
            TRIP_OPEN,
            TRIP_CLOSE,
            CONTROL_BARRIER,
            AUDIT_READ,
        ],
        Role::Supervisor => &[
            ASSET_SITE_READ,
            ASSET_VENDOR_READ,
            ASSET_DEVICE_READ,
            TRIP_READ,
            TRIP_OPEN,
            TRIP_CLOSE,
            CONTROL_BARRIER,
        ],
    };
    codes.iter().map(|code| code.to_string()).collect()
}
