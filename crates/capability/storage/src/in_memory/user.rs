//! 用户内存存储实现
//!
//! 仅用于本地演示和测试。
//!
//! 功能：
//! - 内置 admin 账户（用户名：admin，密码：admin123）
//! - 根据用户名 / ID 查找用户
//! - 角色计数（套餐员工限额用）
//! - refresh jti 轮换与吊销

use crate::error::StorageError;
use crate::models::UserRecord;
use crate::traits::UserStore;
use crate::validation::ensure_tenant;
use domain::{Role, TenantContext, permissions};
use std::collections::HashMap;
use std::sync::RwLock;

/// 用户内存存储
///
/// 使用 RwLock + HashMap（键为 user_id）提供线程安全的内存存储。
pub struct InMemoryUserStore {
    pub(crate) users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// 内置 admin 账户
    ///
    /// 创建包含默认 admin 用户（tenant-1）的存储。
    pub fn with_default_admin() -> Self {
        let store = Self::new();
        {
            let mut users = store.users.write().expect("seed lock");
            users.insert(
                "user-1".to_string(),
                UserRecord {
                    user_id: "user-1".to_string(),
                    tenant_id: "tenant-1".to_string(),
                    username: "admin".to_string(),
                    password: "admin123".to_string(),
                    role: Role::Admin,
                    status: "active".to_string(),
                    permissions: permissions::defaults_for_role(Role::Admin),
                    refresh_jti: None,
                },
            );
        }
        store
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(
        &self,
        ctx: &TenantContext,
        username: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        let users = self
            .users
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(users
            .values()
            .find(|item| {
                item.username == username
                    && (ctx.tenant_id.is_empty() || item.tenant_id == ctx.tenant_id)
            })
            .cloned())
    }

    async fn find_user(
        &self,
        ctx: &TenantContext,
        user_id: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let users = self
            .users
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(users
            .get(user_id)
            .filter(|item| item.tenant_id == ctx.tenant_id)
            .cloned())
    }

    async fn create_user(
        &self,
        ctx: &TenantContext,
        record: UserRecord,
    ) -> Result<UserRecord, StorageError> {
        ensure_tenant(ctx)?;
        if record.tenant_id != ctx.tenant_id {
            return Err(StorageError::new("tenant mismatch"));
        }
        let mut users = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if users.values().any(|item| item.username == record.username) {
            return Err(StorageError::new("username already exists"));
        }
        users.insert(record.user_id.clone(), record.clone());
        Ok(record)
    }

    async fn count_users_with_role(
        &self,
        ctx: &TenantContext,
        role: Role,
    ) -> Result<i64, StorageError> {
        ensure_tenant(ctx)?;
        let users = self
            .users
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let count = users
            .values()
            .filter(|item| item.tenant_id == ctx.tenant_id && item.role == role)
            .count();
        Ok(count as i64)
    }

    async fn update_password_hash(
        &self,
        ctx: &TenantContext,
        user_id: &str,
        password_hash: &str,
    ) -> Result<bool, StorageError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(record) = users.get_mut(user_id).filter(|item| {
            ctx.tenant_id.is_empty() || item.tenant_id == ctx.tenant_id
        }) else {
            return Ok(false);
        };
        record.password = password_hash.to_string();
        Ok(true)
    }

    async fn get_refresh_jti(
        &self,
        ctx: &TenantContext,
        user_id: &str,
    ) -> Result<Option<String>, StorageError> {
        let users = self
            .users
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(users
            .get(user_id)
            .filter(|item| ctx.tenant_id.is_empty() || item.tenant_id == ctx.tenant_id)
            .and_then(|item| item.refresh_jti.clone()))
    }

    async fn set_refresh_jti(
        &self,
        ctx: &TenantContext,
        user_id: &str,
        refresh_jti: Option<&str>,
    ) -> Result<bool, StorageError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(record) = users.get_mut(user_id).filter(|item| {
            ctx.tenant_id.is_empty() || item.tenant_id == ctx.tenant_id
        }) else {
            return Ok(false);
        };
        record.refresh_jti = refresh_jti.map(|value| value.to_string());
        Ok(true)
    }
}
