use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use uuid::Uuid;
use vls_agent::{
    AgentChannel, AgentCommand, AgentCommandKind, AgentConnection, AgentError, AgentListener,
    AgentListenerConfig, AgentReply, REPLY_BARRIER_OPENED, REPLY_LOGIN_OK,
};

fn reply(kind: &str, command_id: Option<String>) -> AgentReply {
    AgentReply {
        kind: kind.to_string(),
        command_id,
        error: None,
    }
}

/// 注册一条假连接，返回其出站帧接收端与 session id。
async fn register_fake_agent(channel: &AgentChannel) -> (mpsc::Receiver<String>, Uuid) {
    let (outbound_tx, outbound_rx) = mpsc::channel(16);
    let session_id = Uuid::new_v4();
    channel
        .register(AgentConnection::new(session_id, "test-agent", outbound_tx))
        .await;
    (outbound_rx, session_id)
}

fn parse_command(frame: &str) -> AgentCommand {
    serde_json::from_str(frame.trim()).expect("command frame")
}

#[tokio::test]
async fn call_without_connection_fails_offline_immediately() {
    let channel = AgentChannel::new();
    let started = Instant::now();
    let result = channel.call(AgentCommandKind::OpenBarrier, 5_000).await;
    assert!(matches!(result, Err(AgentError::Offline)));
    // 不等待超时窗口
    assert!(started.elapsed() < Duration::from_millis(500));
}

#[tokio::test]
async fn call_resolves_with_correlated_reply() {
    let channel = Arc::new(AgentChannel::new());
    let (mut outbound_rx, _) = register_fake_agent(&channel).await;

    let agent = {
        let channel = Arc::clone(&channel);
        tokio::spawn(async move {
            let frame = outbound_rx.recv().await.expect("frame");
            let command = parse_command(&frame);
            assert_eq!(command.kind, AgentCommandKind::OpenBarrier);
            channel
                .resolve(reply(REPLY_BARRIER_OPENED, Some(command.command_id)))
                .await;
        })
    };

    let result = channel
        .call(AgentCommandKind::OpenBarrier, 1_000)
        .await
        .expect("reply");
    assert!(result.is(REPLY_BARRIER_OPENED));
    agent.await.expect("agent task");
}

#[tokio::test]
async fn late_reply_after_timeout_has_no_effect() {
    let channel = Arc::new(AgentChannel::new());
    let (mut outbound_rx, _) = register_fake_agent(&channel).await;

    let result = channel.call(AgentCommandKind::OpenBarrier, 50).await;
    assert!(matches!(result, Err(AgentError::Timeout)));

    // 迟到应答：既不 panic，也不影响下一次调用
    let frame = outbound_rx.recv().await.expect("frame");
    let stale = parse_command(&frame);
    channel
        .resolve(reply(REPLY_BARRIER_OPENED, Some(stale.command_id)))
        .await;

    let channel2 = Arc::clone(&channel);
    let agent = tokio::spawn(async move {
        let frame = outbound_rx.recv().await.expect("frame");
        let command = parse_command(&frame);
        channel2
            .resolve(reply(REPLY_LOGIN_OK, Some(command.command_id)))
            .await;
    });
    let result = channel
        .call(AgentCommandKind::LoginBarrier, 1_000)
        .await
        .expect("reply");
    assert!(result.is(REPLY_LOGIN_OK));
    agent.await.expect("agent task");
}

#[tokio::test]
async fn register_replaces_and_fails_pending_call() {
    let channel = Arc::new(AgentChannel::new());
    let (_outbound_rx, _) = register_fake_agent(&channel).await;

    let pending = {
        let channel = Arc::clone(&channel);
        tokio::spawn(async move { channel.call(AgentCommandKind::OpenBarrier, 5_000).await })
    };
    // 等调用真正挂起后再替换连接
    tokio::time::sleep(Duration::from_millis(50)).await;
    let (_new_rx, _) = register_fake_agent(&channel).await;

    let result = pending.await.expect("join");
    assert!(matches!(result, Err(AgentError::Replaced)));
}

#[tokio::test]
async fn reply_without_command_id_matches_single_pending_call() {
    let channel = Arc::new(AgentChannel::new());
    let (mut outbound_rx, _) = register_fake_agent(&channel).await;

    let agent = {
        let channel = Arc::clone(&channel);
        tokio::spawn(async move {
            let _ = outbound_rx.recv().await.expect("frame");
            channel.resolve(reply(REPLY_LOGIN_OK, None)).await;
        })
    };
    let result = channel
        .call(AgentCommandKind::LoginBarrier, 1_000)
        .await
        .expect("reply");
    assert!(result.is(REPLY_LOGIN_OK));
    agent.await.expect("agent task");
}

#[tokio::test]
async fn remove_leaves_pending_call_to_time_out() {
    let channel = Arc::new(AgentChannel::new());
    let (_outbound_rx, session_id) = register_fake_agent(&channel).await;

    let pending = {
        let channel = Arc::clone(&channel);
        tokio::spawn(async move { channel.call(AgentCommandKind::OpenBarrier, 200).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    channel.remove(session_id).await;
    assert!(!channel.is_connected().await);

    // remove 不立刻失败进行中的调用，等它自己超时
    let result = pending.await.expect("join");
    assert!(matches!(result, Err(AgentError::Timeout)));
}

#[tokio::test]
async fn stale_session_remove_keeps_current_connection() {
    let channel = AgentChannel::new();
    let (_rx1, old_session) = register_fake_agent(&channel).await;
    let (_rx2, _) = register_fake_agent(&channel).await;
    channel.remove(old_session).await;
    assert!(channel.is_connected().await);
}

#[tokio::test]
async fn listener_round_trips_frames_over_tcp() {
    let channel = Arc::new(AgentChannel::new());
    let listener_socket = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener_socket.local_addr().expect("addr");
    let listener = AgentListener::new(
        AgentListenerConfig {
            listen_addr: addr.to_string(),
            outbound_buffer: 16,
        },
        Arc::clone(&channel),
    );
    tokio::spawn(async move {
        let _ = listener.serve(listener_socket).await;
    });

    // 假 Agent：收到命令后回显 commandId 并应答 BARRIER_OPENED
    let stream = tokio::net::TcpStream::connect(addr).await.expect("connect");
    let (read_half, mut write_half) = stream.into_split();
    let agent = tokio::spawn(async move {
        let mut reader = BufReader::new(read_half);
        let mut line = String::new();
        reader.read_line(&mut line).await.expect("read");
        let command: AgentCommand = serde_json::from_str(line.trim()).expect("command");
        let reply = serde_json::json!({
            "type": "BARRIER_OPENED",
            "commandId": command.command_id,
        });
        let mut frame = reply.to_string();
        frame.push('\n');
        write_half.write_all(frame.as_bytes()).await.expect("write");
    });

    // 等注册完成
    for _ in 0..50 {
        if channel.is_connected().await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let reply = channel
        .call(AgentCommandKind::OpenBarrier, 2_000)
        .await
        .expect("reply");
    assert!(reply.is(REPLY_BARRIER_OPENED));
    agent.await.expect("agent task");
}
