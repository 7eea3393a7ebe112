//! Postgres 套餐目录实现

use crate::error::StorageError;
use crate::models::{PlanLimits, PlanRecord};
use crate::traits::PlanStore;
use sqlx::{PgPool, Row};

pub struct PgPlanStore {
    pub pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn plan_from_row(row: &sqlx::postgres::PgRow) -> Result<PlanRecord, StorageError> {
    Ok(PlanRecord {
        plan_code: row.try_get("plan_code")?,
        name: row.try_get("name")?,
        limits: PlanLimits {
            max_project_managers: row.try_get("max_project_managers")?,
            max_supervisors: row.try_get("max_supervisors")?,
            max_anpr: row.try_get("max_anpr")?,
            max_barrier: row.try_get("max_barrier")?,
            max_biometric: row.try_get("max_biometric")?,
        },
    })
}

#[async_trait::async_trait]
impl PlanStore for PgPlanStore {
    async fn list_plans(&self) -> Result<Vec<PlanRecord>, StorageError> {
        let rows = sqlx::query(
            "select plan_code, name, max_project_managers, max_supervisors, \
             max_anpr, max_barrier, max_biometric \
             from plans order by plan_code",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut plans = Vec::with_capacity(rows.len());
        for row in rows {
            plans.push(plan_from_row(&row)?);
        }
        Ok(plans)
    }

    async fn find_plan(&self, plan_code: &str) -> Result<Option<PlanRecord>, StorageError> {
        let row = sqlx::query(
            "select plan_code, name, max_project_managers, max_supervisors, \
             max_anpr, max_barrier, max_biometric \
             from plans where plan_code = $1",
        )
        .bind(plan_code)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(plan_from_row(&row)?))
    }

    async fn create_plan(&self, record: PlanRecord) -> Result<PlanRecord, StorageError> {
        sqlx::query(
            "insert into plans \
             (plan_code, name, max_project_managers, max_supervisors, max_anpr, max_barrier, max_biometric) \
             values ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&record.plan_code)
        .bind(&record.name)
        .bind(record.limits.max_project_managers)
        .bind(record.limits.max_supervisors)
        .bind(record.limits.max_anpr)
        .bind(record.limits.max_barrier)
        .bind(record.limits.max_biometric)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }
}
