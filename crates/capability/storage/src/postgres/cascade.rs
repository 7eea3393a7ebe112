//! 租户停用级联的 Postgres 实现
//!
//! 客户置 inactive、设备全停用、refresh jti 全吊销，三条语句在
//! 同一事务内提交；任何一步失败则整体回滚。

use crate::error::StorageError;
use crate::traits::TenantLifecycleStore;
use sqlx::PgPool;

/// 租户停用级联（Postgres 实现）。
pub struct PgTenantLifecycleStore {
    pub pool: PgPool,
}

impl PgTenantLifecycleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TenantLifecycleStore for PgTenantLifecycleStore {
    async fn deactivate_client(&self, client_id: &str) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("update clients set status = 'inactive' where client_id = $1")
            .bind(client_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("update devices set enabled = false where tenant_id = $1")
            .bind(client_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("update users set refresh_jti = null where tenant_id = $1")
            .bind(client_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
