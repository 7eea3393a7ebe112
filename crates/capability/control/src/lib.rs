//! 硬件控制能力：把闸机意图翻译成 Agent 命令并判定结果。
//!
//! 控制器不做任何持久化；是否审计由调用方决定。

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use vls_agent::{
    AgentChannel, AgentCommandKind, AgentError, AgentReply, REPLY_BARRIER_OPENED, REPLY_LOGIN_OK,
};
use vls_telemetry::{
    record_command_issued, record_command_latency_ms, record_command_offline,
    record_command_rejected, record_command_success, record_command_timeout,
};

/// 控制链路错误。
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error(transparent)]
    Agent(#[from] AgentError),
    /// Agent 给出了应答，但不是预期的成功标志。
    #[error("agent rejected command: {0}")]
    Rejected(String),
}

/// 闸机控制器配置。
#[derive(Debug, Clone)]
pub struct BarrierControllerConfig {
    /// 单条命令的应答超时（毫秒）。到期即永久失败，不续期。
    pub call_timeout_ms: u64,
}

impl Default for BarrierControllerConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 5_000,
        }
    }
}

/// 闸机控制器：LOGIN_BARRIER / OPEN_BARRIER 两个意图。
#[derive(Clone)]
pub struct BarrierController {
    channel: Arc<AgentChannel>,
    config: BarrierControllerConfig,
}

impl BarrierController {
    pub fn new(channel: Arc<AgentChannel>, config: BarrierControllerConfig) -> Self {
        Self { channel, config }
    }

    /// 对闸机 Agent 做登录握手；应答必须是 LOGIN_OK。
    pub async fn authenticate_agent(&self) -> Result<(), ControlError> {
        self.issue(AgentCommandKind::LoginBarrier, REPLY_LOGIN_OK)
            .await
    }

    /// 开闸；应答必须是 BARRIER_OPENED。
    pub async fn actuate_barrier(&self) -> Result<(), ControlError> {
        self.issue(AgentCommandKind::OpenBarrier, REPLY_BARRIER_OPENED)
            .await
    }

    async fn issue(
        &self,
        kind: AgentCommandKind,
        expected_reply: &str,
    ) -> Result<(), ControlError> {
        record_command_issued();
        let started_at = Instant::now();
        let result = self
            .channel
            .call(kind, self.config.call_timeout_ms)
            .await;
        record_command_latency_ms(elapsed_ms(started_at));
        let reply = match result {
            Ok(reply) => reply,
            Err(err) => {
                match &err {
                    AgentError::Offline => record_command_offline(),
                    AgentError::Timeout => record_command_timeout(),
                    _ => {}
                }
                warn!(
                    target: "vls.control",
                    command = kind.as_str(),
                    error = %err,
                    "barrier_command_failed"
                );
                return Err(err.into());
            }
        };
        if !reply.is(expected_reply) {
            record_command_rejected();
            let detail = rejection_detail(&reply);
            warn!(
                target: "vls.control",
                command = kind.as_str(),
                reply_type = %reply.kind,
                detail = %detail,
                "barrier_command_rejected"
            );
            return Err(ControlError::Rejected(detail));
        }
        record_command_success();
        info!(
            target: "vls.control",
            command = kind.as_str(),
            reply_type = %reply.kind,
            "barrier_command_succeeded"
        );
        Ok(())
    }
}

/// 拒绝详情：优先取 Agent 附带的 error 文本，否则落到应答类型。
fn rejection_detail(reply: &AgentReply) -> String {
    match reply.error.as_deref() {
        Some(error) if !error.trim().is_empty() => error.to_string(),
        _ => reply.kind.clone(),
    }
}

fn elapsed_ms(started_at: Instant) -> u64 {
    started_at.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_detail_prefers_error_text() {
        let reply = AgentReply {
            kind: "LOGIN_FAILED".to_string(),
            command_id: None,
            error: Some("bad key".to_string()),
        };
        assert_eq!(rejection_detail(&reply), "bad key");
    }

    #[test]
    fn rejection_detail_falls_back_to_reply_type() {
        let reply = AgentReply {
            kind: "LOGIN_FAILED".to_string(),
            command_id: None,
            error: Some("  ".to_string()),
        };
        assert_eq!(rejection_detail(&reply), "LOGIN_FAILED");
    }
}
