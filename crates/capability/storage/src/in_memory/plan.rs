//! 套餐内存存储实现
//!
//! 仅用于本地演示和测试。

use crate::error::StorageError;
use crate::models::{PlanLimits, PlanRecord};
use crate::traits::PlanStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// 套餐内存存储
pub struct InMemoryPlanStore {
    plans: RwLock<HashMap<String, PlanRecord>>,
}

impl InMemoryPlanStore {
    pub fn new() -> Self {
        Self {
            plans: RwLock::new(HashMap::new()),
        }
    }

    /// 内置基础/标准两档套餐（演示种子）。
    pub fn with_default_plans() -> Self {
        let store = Self::new();
        {
            let mut plans = store.plans.write().expect("seed lock");
            plans.insert(
                "basic".to_string(),
                PlanRecord {
                    plan_code: "basic".to_string(),
                    name: "Basic".to_string(),
                    limits: PlanLimits {
                        max_project_managers: 1,
                        max_supervisors: 4,
                        max_anpr: 2,
                        max_barrier: 1,
                        max_biometric: 0,
                    },
                },
            );
            plans.insert(
                "standard".to_string(),
                PlanRecord {
                    plan_code: "standard".to_string(),
                    name: "Standard".to_string(),
                    limits: PlanLimits {
                        max_project_managers: 4,
                        max_supervisors: 16,
                        max_anpr: 8,
                        max_barrier: 4,
                        max_biometric: 4,
                    },
                },
            );
        }
        store
    }
}

#[async_trait::async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn list_plans(&self) -> Result<Vec<PlanRecord>, StorageError> {
        let plans = self
            .plans
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<PlanRecord> = plans.values().cloned().collect();
        items.sort_by(|a, b| a.plan_code.cmp(&b.plan_code));
        Ok(items)
    }

    async fn find_plan(&self, plan_code: &str) -> Result<Option<PlanRecord>, StorageError> {
        let plans = self
            .plans
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(plans.get(plan_code).cloned())
    }

    async fn create_plan(&self, record: PlanRecord) -> Result<PlanRecord, StorageError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if plans.contains_key(&record.plan_code) {
            return Err(StorageError::new("plan_code already exists"));
        }
        plans.insert(record.plan_code.clone(), record.clone());
        Ok(record)
    }
}
