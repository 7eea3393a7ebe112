//! 验证辅助函数
//!
//! 提供统一的验证逻辑，确保数据一致性：
//! - ensure_tenant：验证租户 ID 非空
//! - ensure_site_scope：验证站点归属（租户 + 站点作用域）
//!
//! 使用场景：
//! - 所有数据访问前验证租户上下文
//! - 站点资源访问前验证站点归属权限

use crate::error::StorageError;
use domain::TenantContext;

/// 验证租户 ID 非空
///
/// 确保所有数据访问都有有效的租户上下文。
pub fn ensure_tenant(ctx: &TenantContext) -> Result<(), StorageError> {
    if ctx.tenant_id.is_empty() {
        return Err(StorageError::new("tenant_id required"));
    }
    Ok(())
}

/// 验证站点归属
///
/// 确保在正确的站点作用域内访问站点资源。
pub fn ensure_site_scope(ctx: &TenantContext, site_id: &str) -> Result<(), StorageError> {
    ensure_tenant(ctx)?;
    if let Some(scope) = ctx.site_scope.as_deref() {
        if scope != site_id {
            return Err(StorageError::new("site scope mismatch"));
        }
    }
    Ok(())
}
