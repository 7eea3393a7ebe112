//! 审计落笔器
//!
//! AuditSink 是唯一的审计写入口：fire-and-forget，追加失败只记日志
//! 和指标，绝不让主操作失败。

use crate::models::AuditLogRecord;
use crate::traits::AuditLogStore;
use domain::TenantContext;
use std::sync::Arc;
use tracing::warn;
use vls_telemetry::{record_audit_append_failure, record_audit_appended};

/// 一次审计事件的业务内容；身份与时间由 AuditSink 补齐。
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub action: String,
    pub module: String,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(action: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            module: module.into(),
            old_value: None,
            new_value: None,
        }
    }

    pub fn with_old(mut self, old_value: serde_json::Value) -> Self {
        self.old_value = Some(old_value);
        self
    }

    pub fn with_new(mut self, new_value: serde_json::Value) -> Self {
        self.new_value = Some(new_value);
        self
    }
}

/// 审计落笔器。
#[derive(Clone)]
pub struct AuditSink {
    store: Arc<dyn AuditLogStore>,
}

impl AuditSink {
    pub fn new(store: Arc<dyn AuditLogStore>) -> Self {
        Self { store }
    }

    /// 追加一条审计记录。错误在此处被完全吸收。
    pub async fn record(&self, ctx: &TenantContext, event: AuditEvent) {
        let record = AuditLogRecord {
            audit_id: uuid::Uuid::new_v4().to_string(),
            tenant_id: ctx.tenant_id.clone(),
            actor: ctx.user_id.clone(),
            role: ctx
                .roles
                .first()
                .map(|role| role.as_db().to_string())
                .unwrap_or_else(|| "system".to_string()),
            action: event.action,
            module: event.module,
            old_value: event.old_value,
            new_value: event.new_value,
            origin: ctx.origin.clone(),
            ts_ms: now_epoch_ms(),
        };
        match self.store.create_audit_log(ctx, record).await {
            Ok(_) => record_audit_appended(),
            Err(err) => {
                record_audit_append_failure();
                warn!(
                    target: "vls.audit",
                    tenant_id = %ctx.tenant_id,
                    actor = %ctx.user_id,
                    error = %err,
                    "audit_append_failed"
                );
            }
        }
    }
}

pub(crate) fn now_epoch_ms() -> i64 {
    let now = std::time::SystemTime::now();
    let duration = now
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_millis() as i64
}

/// 允许外部（留存任务等）复用同一时间基准。
pub fn epoch_ms_now() -> i64 {
    now_epoch_ms()
}
