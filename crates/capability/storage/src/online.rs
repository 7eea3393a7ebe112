//! Online 状态存储接口与实现。

use crate::error::StorageError;
use domain::TenantContext;

#[async_trait::async_trait]
pub trait OnlineStore: Send + Sync {
    async fn touch_device(
        &self,
        ctx: &TenantContext,
        device_id: &str,
        ts_ms: i64,
    ) -> Result<(), StorageError>;

    async fn get_device_last_seen_at_ms(
        &self,
        ctx: &TenantContext,
        device_id: &str,
    ) -> Result<Option<i64>, StorageError>;

    async fn list_devices_last_seen_at_ms(
        &self,
        ctx: &TenantContext,
        device_ids: &[String],
    ) -> Result<std::collections::HashMap<String, i64>, StorageError>;

    /// 清除租户下全部在线标记（停用级联后设备立即判离线）。
    async fn clear_tenant(&self, tenant_id: &str) -> Result<(), StorageError>;
}
