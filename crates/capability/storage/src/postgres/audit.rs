//! Postgres 审计日志实现

use crate::error::StorageError;
use crate::models::AuditLogRecord;
use crate::traits::AuditLogStore;
use crate::validation::ensure_tenant;
use domain::TenantContext;
use sqlx::{PgPool, Row};

pub struct PgAuditLogStore {
    pub pool: PgPool,
}

impl PgAuditLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn value_to_json(value: &Option<serde_json::Value>) -> Result<Option<String>, StorageError> {
    value
        .as_ref()
        .map(|value| serde_json::to_string(value).map_err(|err| StorageError::new(err.to_string())))
        .transpose()
}

fn value_from_json(text: Option<String>) -> Result<Option<serde_json::Value>, StorageError> {
    text.as_deref()
        .map(|text| serde_json::from_str(text).map_err(|err| StorageError::new(err.to_string())))
        .transpose()
}

fn audit_from_row(row: &sqlx::postgres::PgRow) -> Result<AuditLogRecord, StorageError> {
    Ok(AuditLogRecord {
        audit_id: row.try_get("audit_id")?,
        tenant_id: row.try_get("tenant_id")?,
        actor: row.try_get("actor")?,
        role: row.try_get("role")?,
        action: row.try_get("action")?,
        module: row.try_get("module")?,
        old_value: value_from_json(row.try_get("old_value")?)?,
        new_value: value_from_json(row.try_get("new_value")?)?,
        origin: row.try_get("origin")?,
        ts_ms: row.try_get("ts_ms")?,
    })
}

#[async_trait::async_trait]
impl AuditLogStore for PgAuditLogStore {
    async fn create_audit_log(
        &self,
        ctx: &TenantContext,
        record: AuditLogRecord,
    ) -> Result<AuditLogRecord, StorageError> {
        if record.tenant_id != ctx.tenant_id {
            return Err(StorageError::new("tenant mismatch"));
        }
        sqlx::query(
            "insert into audit_logs \
             (audit_id, tenant_id, actor, role, action, module, old_value, new_value, origin, ts_ms) \
             values ($1, $2, $3, $4, $5, $6, $7::jsonb, $8::jsonb, $9, $10)",
        )
        .bind(&record.audit_id)
        .bind(&record.tenant_id)
        .bind(&record.actor)
        .bind(&record.role)
        .bind(&record.action)
        .bind(&record.module)
        .bind(value_to_json(&record.old_value)?)
        .bind(value_to_json(&record.new_value)?)
        .bind(&record.origin)
        .bind(record.ts_ms)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_audit_logs(
        &self,
        ctx: &TenantContext,
        from_ms: Option<i64>,
        to_ms: Option<i64>,
        limit: i64,
    ) -> Result<Vec<AuditLogRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let rows = sqlx::query(
            "select audit_id, tenant_id, actor, role, action, module, \
             old_value::text as old_value, new_value::text as new_value, origin, ts_ms \
             from audit_logs \
             where tenant_id = $1 \
             and ($2::bigint is null or ts_ms >= $2) \
             and ($3::bigint is null or ts_ms <= $3) \
             order by ts_ms desc \
             limit $4",
        )
        .bind(&ctx.tenant_id)
        .bind(from_ms)
        .bind(to_ms)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(audit_from_row(&row)?);
        }
        Ok(items)
    }

    async fn delete_audit_logs_before(&self, cutoff_ms: i64) -> Result<u64, StorageError> {
        let result = sqlx::query("delete from audit_logs where ts_ms < $1")
            .bind(cutoff_ms)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
