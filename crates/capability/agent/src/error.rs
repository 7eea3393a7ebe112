//! Agent 通道错误类型

/// Agent 通道错误。
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// 没有注册任何 Agent 连接；立即失败，不等待。
    #[error("agent offline")]
    Offline,
    /// 超时窗口内没有等到应答；失效的 resolver 已被丢弃。
    #[error("agent reply timed out")]
    Timeout,
    /// 等待期间连接被新 Agent 替换。
    #[error("agent connection replaced")]
    Replaced,
    #[error("agent transport error: {0}")]
    Transport(String),
    #[error("agent frame error: {0}")]
    Codec(String),
}
