//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    /// 未设置时使用内存存储（本地演示与测试）。
    pub database_url: Option<String>,
    /// 未设置时设备在线状态退化为内存实现。
    pub redis_url: Option<String>,
    pub redis_online_ttl_seconds: u64,
    pub agent_listen_addr: String,
    pub agent_call_timeout_ms: u64,
    pub jwt_secret: String,
    pub jwt_access_ttl_seconds: u64,
    pub jwt_refresh_ttl_seconds: u64,
    pub audit_retention_days: u64,
    pub audit_sweep_interval_seconds: u64,
    pub audit_sweep_enabled: bool,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("VLS_JWT_SECRET")
            .map_err(|_| ConfigError::Missing("VLS_JWT_SECRET".to_string()))?;
        let jwt_access_ttl_seconds = read_u64_with_default("VLS_JWT_ACCESS_TTL_SECONDS", 3600)?;
        let jwt_refresh_ttl_seconds = read_u64_with_default("VLS_JWT_REFRESH_TTL_SECONDS", 86_400)?;
        let http_addr = env::var("VLS_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let database_url = read_optional("VLS_DATABASE_URL");
        let redis_url = read_optional("VLS_REDIS_URL");
        let redis_online_ttl_seconds = read_u64_with_default("VLS_REDIS_ONLINE_TTL_SECONDS", 60)?;
        let agent_listen_addr =
            env::var("VLS_AGENT_LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:7070".to_string());
        let agent_call_timeout_ms = read_u64_with_default("VLS_AGENT_CALL_TIMEOUT_MS", 5_000)?;
        let audit_retention_days = read_u64_with_default("VLS_AUDIT_RETENTION_DAYS", 90)?;
        let audit_sweep_interval_seconds =
            read_u64_with_default("VLS_AUDIT_SWEEP_INTERVAL_SECONDS", 3_600)?;
        let audit_sweep_enabled = read_bool_with_default("VLS_AUDIT_SWEEP", true);

        Ok(Self {
            http_addr,
            database_url,
            redis_url,
            redis_online_ttl_seconds,
            agent_listen_addr,
            agent_call_timeout_ms,
            jwt_secret,
            jwt_access_ttl_seconds,
            jwt_refresh_ttl_seconds,
            audit_retention_days,
            audit_sweep_interval_seconds,
            audit_sweep_enabled,
        })
    }
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
