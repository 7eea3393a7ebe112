pub mod data;
pub mod permissions;
pub mod roles;

pub use data::{DeviceType, LoadStatus, MediaBundle, MediaError, TripStatus, MIN_TRIP_PHOTOS};
pub use roles::Role;

/// 租户上下文：所有模块共享的执行上下文。
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: String,
    pub user_id: String,
    pub roles: Vec<Role>,
    pub permissions: Vec<String>,
    pub site_scope: Option<String>,
    /// 请求来源地址（审计用，由 HTTP 层填充）。
    pub origin: Option<String>,
}

impl TenantContext {
    /// 构造显式身份与权限范围的租户上下文。
    pub fn new(
        tenant_id: impl Into<String>,
        user_id: impl Into<String>,
        roles: Vec<Role>,
        permissions: Vec<String>,
        site_scope: Option<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            roles,
            permissions,
            site_scope,
            origin: None,
        }
    }

    /// 是否持有指定角色。
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// 是否持有指定权限码。
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|held| held == permission)
    }
}

impl Default for TenantContext {
    /// 空上下文（仅用于测试或占位）。
    fn default() -> Self {
        Self {
            tenant_id: "".to_string(),
            user_id: "".to_string(),
            roles: Vec::new(),
            permissions: Vec::new(),
            site_scope: None,
            origin: None,
        }
    }
}
