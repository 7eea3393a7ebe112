//! Agent TCP 监听
//!
//! 接受硬件 Agent 的长连接，按行读取 JSON 帧交给 AgentChannel。
//! 每个连接一个读任务 + 一个写任务；新连接注册时自动替换旧连接。

use crate::channel::{AgentChannel, AgentConnection};
use crate::error::AgentError;
use crate::types::AgentReply;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Agent 监听配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentListenerConfig {
    /// 监听地址（host:port）
    pub listen_addr: String,
    /// 出站帧队列长度
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
}

fn default_outbound_buffer() -> usize {
    16
}

/// Agent TCP 监听器
pub struct AgentListener {
    config: AgentListenerConfig,
    channel: Arc<AgentChannel>,
}

impl AgentListener {
    pub fn new(config: AgentListenerConfig, channel: Arc<AgentChannel>) -> Self {
        Self { config, channel }
    }

    /// 绑定配置地址并运行监听循环
    pub async fn run(&self) -> Result<(), AgentError> {
        let listener = TcpListener::bind(&self.config.listen_addr)
            .await
            .map_err(|err| AgentError::Transport(err.to_string()))?;

        info!(
            target: "vls.agent",
            addr = %self.config.listen_addr,
            "agent listener started"
        );
        self.serve(listener).await
    }

    /// 在已绑定的监听套接字上运行（测试可用临时端口）
    pub async fn serve(&self, listener: TcpListener) -> Result<(), AgentError> {
        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    info!(target: "vls.agent", peer = %peer_addr, "agent connection accepted");
                    let channel = Arc::clone(&self.channel);
                    let outbound_buffer = self.config.outbound_buffer;
                    tokio::spawn(async move {
                        if let Err(err) = Self::handle_connection(
                            stream,
                            peer_addr.to_string(),
                            channel,
                            outbound_buffer,
                        )
                        .await
                        {
                            warn!(target: "vls.agent", peer = %peer_addr, error = %err, "agent connection error");
                        }
                    });
                }
                Err(err) => {
                    error!(target: "vls.agent", error = %err, "failed to accept agent connection");
                }
            }
        }
    }

    /// 处理单个 Agent 连接
    async fn handle_connection(
        stream: TcpStream,
        peer: String,
        channel: Arc<AgentChannel>,
        outbound_buffer: usize,
    ) -> Result<(), AgentError> {
        let session_id = Uuid::new_v4();
        let (read_half, mut write_half) = stream.into_split();
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(outbound_buffer.max(1));

        // 写任务：把通道侧的出站帧写入 socket
        let writer = tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                if write_half.write_all(frame.as_bytes()).await.is_err() {
                    break;
                }
            }
        });

        channel
            .register(AgentConnection::new(session_id, peer.clone(), outbound_tx))
            .await;

        let result = Self::read_frames(read_half, &peer, &channel).await;

        channel.remove(session_id).await;
        writer.abort();
        result
    }

    /// 读帧循环：按行读取并交给通道路由
    async fn read_frames(
        read_half: OwnedReadHalf,
        peer: &str,
        channel: &AgentChannel,
    ) -> Result<(), AgentError> {
        let mut reader = BufReader::new(read_half);
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = reader
                .read_line(&mut line)
                .await
                .map_err(|err| AgentError::Transport(err.to_string()))?;
            if bytes_read == 0 {
                info!(target: "vls.agent", peer = %peer, "agent connection closed");
                return Ok(());
            }
            let data = line.trim();
            if data.is_empty() {
                continue;
            }
            match serde_json::from_str::<AgentReply>(data) {
                Ok(reply) => channel.resolve(reply).await,
                Err(err) => {
                    warn!(target: "vls.agent", peer = %peer, error = %err, "agent frame invalid");
                }
            }
        }
    }
}
