//! Agent 通道：唯一连接槽 + 挂起应答表
//!
//! 并发约定：
//! - 连接槽与挂起表由同一把锁保护；resolver 先入表、后发帧，
//!   避免瞬时应答落空
//! - `register` 替换连接并丢弃全部旧 resolver（挂起调用立即收到
//!   Replaced）
//! - 超时后 resolver 被摘除，迟到应答找不到挂点，对已失败的调用
//!   没有任何可见影响
//! - `remove` 只清连接槽，不动挂起表；进行中的调用留给超时收尾

use crate::error::AgentError;
use crate::types::{AgentCommand, AgentCommandKind, AgentReply};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{info, warn};
use uuid::Uuid;
use vls_telemetry::{record_agent_session_opened, record_agent_session_replaced};

/// 当前活跃的 Agent 连接（出站帧经 mpsc 交给写任务）。
#[derive(Debug)]
pub struct AgentConnection {
    pub session_id: Uuid,
    pub peer: String,
    outbound: mpsc::Sender<String>,
}

impl AgentConnection {
    pub fn new(session_id: Uuid, peer: impl Into<String>, outbound: mpsc::Sender<String>) -> Self {
        Self {
            session_id,
            peer: peer.into(),
            outbound,
        }
    }
}

struct ChannelState {
    connection: Option<AgentConnection>,
    pending: HashMap<String, oneshot::Sender<AgentReply>>,
}

/// Agent 通道。
pub struct AgentChannel {
    state: Mutex<ChannelState>,
}

impl AgentChannel {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChannelState {
                connection: None,
                pending: HashMap::new(),
            }),
        }
    }

    /// 安装唯一活跃连接，替换此前的连接。
    ///
    /// 旧连接上的挂起调用立即以 Replaced 失败（丢弃 resolver 即可，
    /// 等待侧把 recv 错误映射为 Replaced）。
    pub async fn register(&self, connection: AgentConnection) {
        let session_id = connection.session_id;
        let peer = connection.peer.clone();
        let mut state = self.state.lock().await;
        let dropped = state.pending.len();
        state.pending.clear();
        let replaced = state.connection.replace(connection);
        if let Some(previous) = replaced {
            record_agent_session_replaced();
            warn!(
                target: "vls.agent",
                old_session = %previous.session_id,
                new_session = %session_id,
                dropped_calls = dropped,
                "agent_session_replaced"
            );
        }
        record_agent_session_opened();
        info!(
            target: "vls.agent",
            session = %session_id,
            peer = %peer,
            "agent_session_opened"
        );
    }

    /// 发出命令并挂起等待应答。
    ///
    /// 离线立即失败；超时后本次调用永久失败，不可续期。
    pub async fn call(
        &self,
        kind: AgentCommandKind,
        timeout_ms: u64,
    ) -> Result<AgentReply, AgentError> {
        let command_id = Uuid::new_v4().to_string();
        let command = AgentCommand {
            kind,
            command_id: command_id.clone(),
        };
        let mut frame =
            serde_json::to_string(&command).map_err(|err| AgentError::Codec(err.to_string()))?;
        frame.push('\n');

        let (resolver, wait) = oneshot::channel();
        let outbound = {
            let mut state = self.state.lock().await;
            let Some(connection) = state.connection.as_ref() else {
                return Err(AgentError::Offline);
            };
            let outbound = connection.outbound.clone();
            state.pending.insert(command_id.clone(), resolver);
            outbound
        };

        if outbound.send(frame).await.is_err() {
            // 写任务已退出：连接实际已死，收回 resolver 并按离线处理
            let mut state = self.state.lock().await;
            state.pending.remove(&command_id);
            if state
                .connection
                .as_ref()
                .map(|connection| connection.outbound.is_closed())
                .unwrap_or(false)
            {
                state.connection = None;
            }
            return Err(AgentError::Offline);
        }

        match tokio::time::timeout(Duration::from_millis(timeout_ms), wait).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(AgentError::Replaced),
            Err(_) => {
                let mut state = self.state.lock().await;
                state.pending.remove(&command_id);
                Err(AgentError::Timeout)
            }
        }
    }

    /// 把入站应答路由给对应的挂起调用。
    ///
    /// 无 commandId 的应答仅在恰有一个挂起命令时归属（兼容旧
    /// Agent）；其余情况丢弃并记日志。
    pub async fn resolve(&self, reply: AgentReply) {
        let mut state = self.state.lock().await;
        let resolver = match reply.command_id.as_deref() {
            Some(command_id) => state.pending.remove(command_id),
            None if state.pending.len() == 1 => {
                let command_id = state.pending.keys().next().cloned();
                command_id.and_then(|command_id| state.pending.remove(&command_id))
            }
            None => None,
        };
        match resolver {
            Some(resolver) => {
                // 等待方可能恰在此刻超时离场；此时丢弃即可
                let _ = resolver.send(reply);
            }
            None => warn!(
                target: "vls.agent",
                reply_type = %reply.kind,
                command_id = ?reply.command_id,
                "agent_reply_unmatched_dropped"
            ),
        }
    }

    /// 清除连接槽（仅当 session 仍是当前连接）。
    ///
    /// 挂起调用不在此处失败，按约定留给各自的超时收尾。
    pub async fn remove(&self, session_id: Uuid) {
        let mut state = self.state.lock().await;
        let is_current = state
            .connection
            .as_ref()
            .map(|connection| connection.session_id == session_id)
            .unwrap_or(false);
        if is_current {
            state.connection = None;
            info!(target: "vls.agent", session = %session_id, "agent_session_removed");
        }
    }

    /// 当前是否有 Agent 在线。
    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.connection.is_some()
    }
}

impl Default for AgentChannel {
    fn default() -> Self {
        Self::new()
    }
}
