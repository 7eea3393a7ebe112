//! 客户内存存储实现
//!
//! 仅用于本地演示和测试。

use crate::error::StorageError;
use crate::models::{ClientRecord, ClientUpdate, PlanLimits};
use crate::traits::ClientStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// 客户内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
pub struct InMemoryClientStore {
    pub(crate) clients: RwLock<HashMap<String, ClientRecord>>,
}

impl InMemoryClientStore {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// 内置演示客户（tenant-1，basic 套餐，与默认 admin 同租户）。
    pub fn with_default_client() -> Self {
        let store = Self::new();
        {
            let mut clients = store.clients.write().expect("seed lock");
            clients.insert(
                "tenant-1".to_string(),
                ClientRecord {
                    client_id: "tenant-1".to_string(),
                    name: "Demo Logistics".to_string(),
                    status: "active".to_string(),
                    plan_code: "basic".to_string(),
                    limits: PlanLimits {
                        max_project_managers: 1,
                        max_supervisors: 4,
                        max_anpr: 2,
                        max_barrier: 1,
                        max_biometric: 0,
                    },
                },
            );
        }
        store
    }
}

#[async_trait::async_trait]
impl ClientStore for InMemoryClientStore {
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, StorageError> {
        let clients = self
            .clients
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<ClientRecord> = clients.values().cloned().collect();
        items.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        Ok(items)
    }

    async fn find_client(&self, client_id: &str) -> Result<Option<ClientRecord>, StorageError> {
        let clients = self
            .clients
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(clients.get(client_id).cloned())
    }

    async fn create_client(&self, record: ClientRecord) -> Result<ClientRecord, StorageError> {
        let mut clients = self
            .clients
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if clients.contains_key(&record.client_id) {
            return Err(StorageError::new("client_id already exists"));
        }
        clients.insert(record.client_id.clone(), record.clone());
        Ok(record)
    }

    async fn update_client(
        &self,
        client_id: &str,
        update: ClientUpdate,
    ) -> Result<Option<ClientRecord>, StorageError> {
        let mut clients = self
            .clients
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(record) = clients.get_mut(client_id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            record.name = name;
        }
        Ok(Some(record.clone()))
    }

    async fn change_plan(
        &self,
        client_id: &str,
        plan_code: &str,
        limits: PlanLimits,
    ) -> Result<Option<ClientRecord>, StorageError> {
        let mut clients = self
            .clients
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(record) = clients.get_mut(client_id) else {
            return Ok(None);
        };
        record.plan_code = plan_code.to_string();
        record.limits = limits;
        Ok(Some(record.clone()))
    }
}
