//! 审计留存清理
//!
//! 固定周期删除过期审计记录。失败只记日志，下个周期重试——
//! 不退避、不告警。

use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use vls_storage::{AuditLogStore, epoch_ms_now};
use vls_telemetry::record_retention_deleted;

/// 启动留存清理周期任务。
pub fn spawn_audit_retention_task(
    audit_store: Arc<dyn AuditLogStore>,
    interval: Duration,
    max_age: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let cutoff_ms = epoch_ms_now() - max_age.as_millis() as i64;
            match audit_store.delete_audit_logs_before(cutoff_ms).await {
                Ok(0) => {}
                Ok(deleted) => {
                    record_retention_deleted(deleted);
                    info!(
                        target: "vls.api",
                        deleted = deleted,
                        cutoff_ms = cutoff_ms,
                        "audit_retention_swept"
                    );
                }
                Err(err) => {
                    warn!(
                        target: "vls.api",
                        error = %err,
                        "audit_retention_sweep_failed"
                    );
                }
            }
        }
    })
}
