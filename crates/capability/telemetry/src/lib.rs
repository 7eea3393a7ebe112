//! 追踪与请求 ID 生成。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 基础指标快照（MVP）。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub agent_sessions_opened: u64,
    pub agent_sessions_replaced: u64,
    pub commands_issued: u64,
    pub command_success: u64,
    pub command_rejected: u64,
    pub command_timeout: u64,
    pub command_offline: u64,
    pub command_latency_ms_total: u64,
    pub command_latency_ms_count: u64,
    pub trips_opened: u64,
    pub trips_closed: u64,
    pub trip_media_rejected: u64,
    pub trip_close_conflicts: u64,
    pub quota_admitted: u64,
    pub quota_denied: u64,
    pub audit_appended: u64,
    pub audit_append_failures: u64,
    pub retention_deleted: u64,
}

/// 基础指标（MVP）。
pub struct TelemetryMetrics {
    agent_sessions_opened: AtomicU64,
    agent_sessions_replaced: AtomicU64,
    commands_issued: AtomicU64,
    command_success: AtomicU64,
    command_rejected: AtomicU64,
    command_timeout: AtomicU64,
    command_offline: AtomicU64,
    command_latency_ms_total: AtomicU64,
    command_latency_ms_count: AtomicU64,
    trips_opened: AtomicU64,
    trips_closed: AtomicU64,
    trip_media_rejected: AtomicU64,
    trip_close_conflicts: AtomicU64,
    quota_admitted: AtomicU64,
    quota_denied: AtomicU64,
    audit_appended: AtomicU64,
    audit_append_failures: AtomicU64,
    retention_deleted: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            agent_sessions_opened: AtomicU64::new(0),
            agent_sessions_replaced: AtomicU64::new(0),
            commands_issued: AtomicU64::new(0),
            command_success: AtomicU64::new(0),
            command_rejected: AtomicU64::new(0),
            command_timeout: AtomicU64::new(0),
            command_offline: AtomicU64::new(0),
            command_latency_ms_total: AtomicU64::new(0),
            command_latency_ms_count: AtomicU64::new(0),
            trips_opened: AtomicU64::new(0),
            trips_closed: AtomicU64::new(0),
            trip_media_rejected: AtomicU64::new(0),
            trip_close_conflicts: AtomicU64::new(0),
            quota_admitted: AtomicU64::new(0),
            quota_denied: AtomicU64::new(0),
            audit_appended: AtomicU64::new(0),
            audit_append_failures: AtomicU64::new(0),
            retention_deleted: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            agent_sessions_opened: self.agent_sessions_opened.load(Ordering::Relaxed),
            agent_sessions_replaced: self.agent_sessions_replaced.load(Ordering::Relaxed),
            commands_issued: self.commands_issued.load(Ordering::Relaxed),
            command_success: self.command_success.load(Ordering::Relaxed),
            command_rejected: self.command_rejected.load(Ordering::Relaxed),
            command_timeout: self.command_timeout.load(Ordering::Relaxed),
            command_offline: self.command_offline.load(Ordering::Relaxed),
            command_latency_ms_total: self.command_latency_ms_total.load(Ordering::Relaxed),
            command_latency_ms_count: self.command_latency_ms_count.load(Ordering::Relaxed),
            trips_opened: self.trips_opened.load(Ordering::Relaxed),
            trips_closed: self.trips_closed.load(Ordering::Relaxed),
            trip_media_rejected: self.trip_media_rejected.load(Ordering::Relaxed),
            trip_close_conflicts: self.trip_close_conflicts.load(Ordering::Relaxed),
            quota_admitted: self.quota_admitted.load(Ordering::Relaxed),
            quota_denied: self.quota_denied.load(Ordering::Relaxed),
            audit_appended: self.audit_appended.load(Ordering::Relaxed),
            audit_append_failures: self.audit_append_failures.load(Ordering::Relaxed),
            retention_deleted: self.retention_deleted.load(Ordering::Relaxed),
        }
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例（MVP）。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录 Agent 会话建立次数。
pub fn record_agent_session_opened() {
    metrics()
        .agent_sessions_opened
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录 Agent 会话被新连接替换次数。
pub fn record_agent_session_replaced() {
    metrics()
        .agent_sessions_replaced
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录硬件命令发起次数。
pub fn record_command_issued() {
    metrics().commands_issued.fetch_add(1, Ordering::Relaxed);
}

/// 记录硬件命令成功次数。
pub fn record_command_success() {
    metrics().command_success.fetch_add(1, Ordering::Relaxed);
}

/// 记录 Agent 拒绝命令次数。
pub fn record_command_rejected() {
    metrics().command_rejected.fetch_add(1, Ordering::Relaxed);
}

/// 记录命令应答超时次数。
pub fn record_command_timeout() {
    metrics().command_timeout.fetch_add(1, Ordering::Relaxed);
}

/// 记录 Agent 离线拒发次数。
pub fn record_command_offline() {
    metrics().command_offline.fetch_add(1, Ordering::Relaxed);
}

/// 记录命令往返耗时（毫秒）。
pub fn record_command_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .command_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .command_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录行程开启次数。
pub fn record_trip_opened() {
    metrics().trips_opened.fetch_add(1, Ordering::Relaxed);
}

/// 记录行程关闭次数。
pub fn record_trip_closed() {
    metrics().trips_closed.fetch_add(1, Ordering::Relaxed);
}

/// 记录证据不完整被拒次数。
pub fn record_trip_media_rejected() {
    metrics()
        .trip_media_rejected
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录并发关闭落败次数（已是终态）。
pub fn record_trip_close_conflict() {
    metrics()
        .trip_close_conflicts
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录配额放行次数。
pub fn record_quota_admitted() {
    metrics().quota_admitted.fetch_add(1, Ordering::Relaxed);
}

/// 记录配额拒绝次数。
pub fn record_quota_denied() {
    metrics().quota_denied.fetch_add(1, Ordering::Relaxed);
}

/// 记录审计追加成功次数。
pub fn record_audit_appended() {
    metrics().audit_appended.fetch_add(1, Ordering::Relaxed);
}

/// 记录审计追加失败（被吞掉）次数。
pub fn record_audit_append_failure() {
    metrics()
        .audit_append_failures
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录留存清理删除条数。
pub fn record_retention_deleted(count: u64) {
    metrics().retention_deleted.fetch_add(count, Ordering::Relaxed);
}
