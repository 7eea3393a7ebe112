//! Postgres 用户存储实现
//!
//! 设计要点：
//! - 登录查询支持全局用户名检索（ctx 租户为空时）
//! - refresh_jti 存于用户行，轮换/吊销为单列 UPDATE

use crate::error::StorageError;
use crate::models::UserRecord;
use crate::traits::UserStore;
use crate::validation::ensure_tenant;
use domain::{Role, TenantContext};
use sqlx::{PgPool, Row};

pub struct PgUserStore {
    pub pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

const USER_COLUMNS: &str =
    "user_id, tenant_id, username, password_hash, role, status, permissions, refresh_jti";

fn user_from_row(row: &sqlx::postgres::PgRow) -> Result<UserRecord, StorageError> {
    let role: String = row.try_get("role")?;
    let role = Role::from_db(&role)
        .ok_or_else(|| StorageError::new(format!("invalid role: {role}")))?;
    Ok(UserRecord {
        user_id: row.try_get("user_id")?,
        tenant_id: row.try_get("tenant_id")?,
        username: row.try_get("username")?,
        password: row.try_get("password_hash")?,
        role,
        status: row.try_get("status")?,
        permissions: row.try_get("permissions")?,
        refresh_jti: row.try_get("refresh_jti")?,
    })
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(
        &self,
        ctx: &TenantContext,
        username: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        let row = if ctx.tenant_id.is_empty() {
            sqlx::query(&format!(
                "select {USER_COLUMNS} from users where username = $1"
            ))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
        } else {
            sqlx::query(&format!(
                "select {USER_COLUMNS} from users where username = $1 and tenant_id = $2"
            ))
            .bind(username)
            .bind(&ctx.tenant_id)
            .fetch_optional(&self.pool)
            .await?
        };
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(user_from_row(&row)?))
    }

    async fn find_user(
        &self,
        ctx: &TenantContext,
        user_id: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let row = sqlx::query(&format!(
            "select {USER_COLUMNS} from users where tenant_id = $1 and user_id = $2"
        ))
        .bind(&ctx.tenant_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(user_from_row(&row)?))
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
        sqlx::query(
            "insert into users \
             (user_id, tenant_id, username, password_hash, role, status, permissions, refresh_jti) \
             values ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&record.user_id)
        .bind(&record.tenant_id)
        .bind(&record.username)
        .bind(&record.password)
        .bind(record.role.as_db())
        .bind(&record.status)
        .bind(&record.permissions)
        .bind(&record.refresh_jti)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn count_users_with_role(
        &self,
        ctx: &TenantContext,
        role: Role,
    ) -> Result<i64, StorageError> {
        ensure_tenant(ctx)?;
        let count: i64 = sqlx::query_scalar(
            "select count(*) from users where tenant_id = $1 and role = $2",
        )
        .bind(&ctx.tenant_id)
        .bind(role.as_db())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn update_password_hash(
        &self,
        ctx: &TenantContext,
        user_id: &str,
        password_hash: &str,
    ) -> Result<bool, StorageError> {
        let result = if ctx.tenant_id.is_empty() {
            sqlx::query("update users set password_hash = $2 where user_id = $1")
                .bind(user_id)
                .bind(password_hash)
                .execute(&self.pool)
                .await?
        } else {
            sqlx::query(
                "update users set password_hash = $3 where tenant_id = $1 and user_id = $2",
            )
            .bind(&ctx.tenant_id)
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?
        };
        Ok(result.rows_affected() > 0)
    }

    async fn get_refresh_jti(
        &self,
        ctx: &TenantContext,
        user_id: &str,
    ) -> Result<Option<String>, StorageError> {
        let row = if ctx.tenant_id.is_empty() {
            sqlx::query("select refresh_jti from users where user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
        } else {
            sqlx::query("select refresh_jti from users where tenant_id = $1 and user_id = $2")
                .bind(&ctx.tenant_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
        };
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(row.try_get("refresh_jti")?)
    }

    async fn set_refresh_jti(
        &self,
        ctx: &TenantContext,
        user_id: &str,
        refresh_jti: Option<&str>,
    ) -> Result<bool, StorageError> {
        let result = if ctx.tenant_id.is_empty() {
            sqlx::query("update users set refresh_jti = $2 where user_id = $1")
                .bind(user_id)
                .bind(refresh_jti)
                .execute(&self.pool)
                .await?
        } else {
            sqlx::query(
                "update users set refresh_jti = $3 where tenant_id = $1 and user_id = $2",
            )
            .bind(&ctx.tenant_id)
            .bind(user_id)
            .bind(refresh_jti)
            .execute(&self.pool)
            .await?
        };
        Ok(result.rows_affected() > 0)
    }
}
