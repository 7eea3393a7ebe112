//! Redis 在线状态实现
//!
//! 设备心跳以带 TTL 的键保存，过期即判离线；租户停用时按前缀
//! SCAN 清除全部在线标记。

use crate::error::StorageError;
use crate::online::OnlineStore;
use crate::validation::ensure_tenant;
use domain::TenantContext;
use redis::AsyncCommands;

#[derive(serde::Serialize, serde::Deserialize)]
struct OnlinePayload {
    ts_ms: i64,
}

fn device_online_key(tenant_id: &str, device_id: &str) -> String {
    format!("tenant:{}:device:{}:online", tenant_id, device_id)
}

/// Redis Online 状态存储（device）。
pub struct RedisOnlineStore {
    client: redis::Client,
    ttl_seconds: u64,
}

impl RedisOnlineStore {
    pub fn connect(redis_url: &str, ttl_seconds: u64) -> Result<Self, StorageError> {
        let client =
            redis::Client::open(redis_url).map_err(|err| StorageError::new(err.to_string()))?;
        let ttl = ttl_seconds.max(1);
        Ok(Self {
            client,
            ttl_seconds: ttl,
        })
    }
}

#[async_trait::async_trait]
impl OnlineStore for RedisOnlineStore {
    async fn touch_device(
        &self,
        ctx: &TenantContext,
        device_id: &str,
        ts_ms: i64,
    ) -> Result<(), StorageError> {
        ensure_tenant(ctx)?;
        let mut connection = self
            .client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|err| StorageError::new(err.to_string()))?;
        let data = serde_json::to_string(&OnlinePayload { ts_ms })
            .map_err(|err| StorageError::new(err.to_string()))?;
        let key = device_online_key(&ctx.tenant_id, device_id);
        connection
            .set_ex::<_, _, ()>(key, data, self.ttl_seconds)
            .await
            .map_err(|err| StorageError::new(err.to_string()))?;
        Ok(())
    }

    async fn get_device_last_seen_at_ms(
        &self,
        ctx: &TenantContext,
        device_id: &str,
    ) -> Result<Option<i64>, StorageError> {
        ensure_tenant(ctx)?;
        let mut connection = self
            .client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|err| StorageError::new(err.to_string()))?;
        let key = device_online_key(&ctx.tenant_id, device_id);
        let data: Option<String> = connection
            .get(key)
            .await
            .map_err(|err| StorageError::new(err.to_string()))?;
        let Some(data) = data else {
            return Ok(None);
        };
        let payload: OnlinePayload =
            serde_json::from_str(&data).map_err(|err| StorageError::new(err.to_string()))?;
        Ok(Some(payload.ts_ms))
    }

    async fn list_devices_last_seen_at_ms(
        &self,
        ctx: &TenantContext,
        device_ids: &[String],
    ) -> Result<std::collections::HashMap<String, i64>, StorageError> {
        ensure_tenant(ctx)?;
        if device_ids.is_empty() {
            return Ok(std::collections::HashMap::new());
        }
        let mut connection = self
            .client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|err| StorageError::new(err.to_string()))?;
        let keys: Vec<String> = device_ids
            .iter()
            .map(|device_id| device_online_key(&ctx.tenant_id, device_id))
            .collect();
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut connection)
            .await
            .map_err(|err| StorageError::new(err.to_string()))?;
        let mut result = std::collections::HashMap::new();
        for (device_id, value) in device_ids.iter().zip(values) {
            let Some(value) = value else {
                continue;
            };
            let payload: OnlinePayload = serde_json::from_str(&value)
                .map_err(|err| StorageError::new(err.to_string()))?;
            result.insert(device_id.clone(), payload.ts_ms);
        }
        Ok(result)
    }

    async fn clear_tenant(&self, tenant_id: &str) -> Result<(), StorageError> {
        let mut connection = self
            .client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|err| StorageError::new(err.to_string()))?;
        let pattern = format!("tenant:{}:device:*:online", tenant_id);
        let mut cursor: u64 = 0;
        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut connection)
                .await
                .map_err(|err| StorageError::new(err.to_string()))?;
            if !keys.is_empty() {
                let _: i64 = redis::cmd("DEL")
                    .arg(&keys)
                    .query_async(&mut connection)
                    .await
                    .map_err(|err| StorageError::new(err.to_string()))?;
            }
            if next_cursor == 0 {
                break;
            }
            cursor = next_cursor;
        }
        Ok(())
    }
}
