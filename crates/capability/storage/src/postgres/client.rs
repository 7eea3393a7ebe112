//! Postgres 客户存储实现
//!
//! 限额快照列与 plan_code 同表同行，换套餐单条 UPDATE 即原子生效。

use crate::error::StorageError;
use crate::models::{ClientRecord, ClientUpdate, PlanLimits};
use crate::traits::ClientStore;
use sqlx::{PgPool, Row};

pub struct PgClientStore {
    pub pool: PgPool,
}

impl PgClientStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CLIENT_COLUMNS: &str = "client_id, name, status, plan_code, \
     max_project_managers, max_supervisors, max_anpr, max_barrier, max_biometric";

fn client_from_row(row: &sqlx::postgres::PgRow) -> Result<ClientRecord, StorageError> {
    Ok(ClientRecord {
        client_id: row.try_get("client_id")?,
        name: row.try_get("name")?,
        status: row.try_get("status")?,
        plan_code: row.try_get("plan_code")?,
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
impl ClientStore for PgClientStore {
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {CLIENT_COLUMNS} from clients order by client_id"
        ))
        .fetch_all(&self.pool)
        .await?;
        let mut clients = Vec::with_capacity(rows.len());
        for row in rows {
            clients.push(client_from_row(&row)?);
        }
        Ok(clients)
    }

    async fn find_client(&self, client_id: &str) -> Result<Option<ClientRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "select {CLIENT_COLUMNS} from clients where client_id = $1"
        ))
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(client_from_row(&row)?))
    }

    async fn create_client(&self, record: ClientRecord) -> Result<ClientRecord, StorageError> {
        sqlx::query(
            "insert into clients \
             (client_id, name, status, plan_code, max_project_managers, max_supervisors, \
              max_anpr, max_barrier, max_biometric) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&record.client_id)
        .bind(&record.name)
        .bind(&record.status)
        .bind(&record.plan_code)
        .bind(record.limits.max_project_managers)
        .bind(record.limits.max_supervisors)
        .bind(record.limits.max_anpr)
        .bind(record.limits.max_barrier)
        .bind(record.limits.max_biometric)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn update_client(
        &self,
        client_id: &str,
        update: ClientUpdate,
    ) -> Result<Option<ClientRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "update clients set name = coalesce($2, name) \
             where client_id = $1 \
             returning {CLIENT_COLUMNS}"
        ))
        .bind(client_id)
        .bind(update.name)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(client_from_row(&row)?))
    }

    async fn change_plan(
        &self,
        client_id: &str,
        plan_code: &str,
        limits: PlanLimits,
    ) -> Result<Option<ClientRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "update clients set plan_code = $2, max_project_managers = $3, \
             max_supervisors = $4, max_anpr = $5, max_barrier = $6, max_biometric = $7 \
             where client_id = $1 \
             returning {CLIENT_COLUMNS}"
        ))
        .bind(client_id)
        .bind(plan_code)
        .bind(limits.max_project_managers)
        .bind(limits.max_supervisors)
        .bind(limits.max_anpr)
        .bind(limits.max_barrier)
        .bind(limits.max_biometric)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(client_from_row(&row)?))
    }
}
