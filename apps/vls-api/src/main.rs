//! VLS API 服务器
//!
//! 单一运行时二进制：
//! - HTTP API（axum）：认证、客户/站点/承运商/设备/行程/审计
//! - 闸机 Agent TCP 监听（vls-agent）
//! - 审计留存清理周期任务
//!
//! 存储后端按配置选择：设置 VLS_DATABASE_URL 走 Postgres，
//! 否则使用内置种子数据的内存存储（本地演示与测试）。

mod handlers;
mod middleware;
mod retention;
mod routes;
mod state;
#[cfg(test)]
mod tests;
mod utils;

pub use state::AppState;

use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use vls_agent::{AgentListener, AgentListenerConfig};
use vls_config::AppConfig;
use vls_telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let state = state::build_state(&config).await?;

    // 闸机 Agent TCP 监听
    let agent_listener = AgentListener::new(
        AgentListenerConfig {
            listen_addr: config.agent_listen_addr.clone(),
            outbound_buffer: 16,
        },
        Arc::clone(&state.agent_channel),
    );
    tokio::spawn(async move {
        if let Err(err) = agent_listener.run().await {
            tracing::error!(target: "vls.agent", error = %err, "agent listener exited");
        }
    });

    // 审计留存清理
    if config.audit_sweep_enabled {
        retention::spawn_audit_retention_task(
            Arc::clone(&state.audit_log_store),
            Duration::from_secs(config.audit_sweep_interval_seconds.max(1)),
            Duration::from_secs(config.audit_retention_days.max(1) * 24 * 3600),
        );
    }

    let app = routes::create_api_router()
        .with_state(state)
        // 注入 request_id/trace_id
        .layer(axum::middleware::from_fn(middleware::request_context))
        .layer(tower_http::trace::TraceLayer::new_for_http());

    info!(target: "vls.api", addr = %config.http_addr, "http server starting");
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
