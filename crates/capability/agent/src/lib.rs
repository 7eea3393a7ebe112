//! 闸机 Agent 通道
//!
//! 把"单条长连接 + 异步不请自来的消息"收敛成带超时的同步式
//! call/response：
//! - `AgentChannel`：唯一连接槽 + 按 commandId 关联的挂起应答表
//! - `AgentListener`：TCP 监听，按行读取 JSON 帧
//!
//! 同一时刻最多一个 Agent 在线；新连接替换旧连接时，旧连接上
//! 挂起的调用立即以 Replaced 失败。

pub mod channel;
pub mod error;
pub mod listener;
pub mod types;

pub use channel::{AgentChannel, AgentConnection};
pub use error::AgentError;
pub use listener::{AgentListener, AgentListenerConfig};
pub use types::{AgentCommand, AgentCommandKind, AgentReply, REPLY_BARRIER_OPENED, REPLY_LOGIN_OK};
