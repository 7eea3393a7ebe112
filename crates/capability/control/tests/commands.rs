use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;
use vls_agent::{AgentChannel, AgentConnection, AgentError, AgentReply};
use vls_control::{BarrierController, BarrierControllerConfig, ControlError};

fn controller(channel: &Arc<AgentChannel>, timeout_ms: u64) -> BarrierController {
    BarrierController::new(
        Arc::clone(channel),
        BarrierControllerConfig {
            call_timeout_ms: timeout_ms,
        },
    )
}

/// 注册假 Agent：对每条命令按给定应答模板回复（回显 commandId）。
async fn spawn_scripted_agent(channel: &Arc<AgentChannel>, reply_type: &str, error: Option<&str>) {
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(16);
    channel
        .register(AgentConnection::new(
            Uuid::new_v4(),
            "scripted-agent",
            outbound_tx,
        ))
        .await;
    let channel = Arc::clone(channel);
    let reply_type = reply_type.to_string();
    let error = error.map(|value| value.to_string());
    tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            let command: serde_json::Value =
                serde_json::from_str(frame.trim()).expect("command frame");
            let command_id = command["commandId"].as_str().map(|value| value.to_string());
            channel
                .resolve(AgentReply {
                    kind: reply_type.clone(),
                    command_id,
                    error: error.clone(),
                })
                .await;
        }
    });
}

#[tokio::test]
async fn actuate_barrier_succeeds_on_opened_reply() {
    let channel = Arc::new(AgentChannel::new());
    spawn_scripted_agent(&channel, "BARRIER_OPENED", None).await;
    controller(&channel, 1_000)
        .actuate_barrier()
        .await
        .expect("opened");
}

#[tokio::test]
async fn authenticate_agent_succeeds_on_login_ok() {
    let channel = Arc::new(AgentChannel::new());
    spawn_scripted_agent(&channel, "LOGIN_OK", None).await;
    controller(&channel, 1_000)
        .authenticate_agent()
        .await
        .expect("login ok");
}

#[tokio::test]
async fn unexpected_reply_is_rejected_with_agent_error_text() {
    let channel = Arc::new(AgentChannel::new());
    spawn_scripted_agent(&channel, "BARRIER_FAULT", Some("motor jammed")).await;
    let result = controller(&channel, 1_000).actuate_barrier().await;
    match result {
        Err(ControlError::Rejected(detail)) => assert_eq!(detail, "motor jammed"),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn offline_channel_fails_immediately() {
    let channel = Arc::new(AgentChannel::new());
    let result = controller(&channel, 5_000).actuate_barrier().await;
    assert!(matches!(
        result,
        Err(ControlError::Agent(AgentError::Offline))
    ));
}

#[tokio::test]
async fn silent_agent_times_out() {
    let channel = Arc::new(AgentChannel::new());
    // 注册但从不应答
    let (outbound_tx, _outbound_rx) = mpsc::channel::<String>(16);
    channel
        .register(AgentConnection::new(Uuid::new_v4(), "mute-agent", outbound_tx))
        .await;
    let result = controller(&channel, 100).actuate_barrier().await;
    assert!(matches!(
        result,
        Err(ControlError::Agent(AgentError::Timeout))
    ));
}
