//! Agent 线协议帧
//!
//! 行分隔 JSON。命令一律携带 commandId；应答回显该 ID 用于关联
//! （不回显时只在恰有一个挂起命令的情况下归属，兼容旧 Agent）。

use serde::{Deserialize, Serialize};

/// 登录成功应答类型。
pub const REPLY_LOGIN_OK: &str = "LOGIN_OK";
/// 开闸成功应答类型。
pub const REPLY_BARRIER_OPENED: &str = "BARRIER_OPENED";

/// 服务端发往 Agent 的命令类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentCommandKind {
    #[serde(rename = "LOGIN_BARRIER")]
    LoginBarrier,
    #[serde(rename = "OPEN_BARRIER")]
    OpenBarrier,
}

impl AgentCommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginBarrier => "LOGIN_BARRIER",
            Self::OpenBarrier => "OPEN_BARRIER",
        }
    }
}

/// 出站命令帧。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCommand {
    #[serde(rename = "type")]
    pub kind: AgentCommandKind,
    pub command_id: String,
}

/// 入站应答帧。
///
/// `type` 之外的形状一律视为失败信号，`error` 可携带 Agent 侧说明。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReply {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub command_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AgentReply {
    /// 应答是否为指定成功类型。
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_frame_shape() {
        let command = AgentCommand {
            kind: AgentCommandKind::OpenBarrier,
            command_id: "cmd-1".to_string(),
        };
        let value = serde_json::to_value(&command).expect("serialize");
        assert_eq!(value["type"], "OPEN_BARRIER");
        assert_eq!(value["commandId"], "cmd-1");
    }

    #[test]
    fn reply_parses_without_command_id() {
        let reply: AgentReply =
            serde_json::from_str(r#"{"type":"LOGIN_OK"}"#).expect("parse");
        assert!(reply.is(REPLY_LOGIN_OK));
        assert!(reply.command_id.is_none());
        assert!(reply.error.is_none());
    }

    #[test]
    fn reply_parses_error_text() {
        let reply: AgentReply =
            serde_json::from_str(r#"{"type":"LOGIN_FAILED","error":"bad key"}"#).expect("parse");
        assert!(!reply.is(REPLY_LOGIN_OK));
        assert_eq!(reply.error.as_deref(), Some("bad key"));
    }
}
