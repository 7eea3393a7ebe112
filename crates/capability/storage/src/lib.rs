//! # VLS Storage 模块
//!
//! 本模块提供统一的数据存储抽象层，支持多种存储后端实现。
//!
//! ## 架构设计
//!
//! 该模块采用分层架构，遵循以下原则：
//!
//! 1. **接口抽象层** (`traits.rs`)：定义所有资源存储的异步 Trait 接口
//! 2. **数据模型层** (`models.rs`)：定义存储相关的数据结构
//! 3. **错误处理层** (`error.rs`)：统一的存储错误类型
//! 4. **验证辅助层** (`validation.rs`)：多租户和站点作用域验证
//! 5. **连接管理层** (`connection.rs`)：数据库连接池管理
//! 6. **审计落笔** (`audit.rs`)：fire-and-forget 审计追加（失败被吸收）
//! 7. **实现层**：
//!    - `in_memory/`：内存存储实现（用于测试和演示）
//!    - `postgres/`：PostgreSQL 存储实现（生产环境使用）
//!    - `redis.rs`：设备在线状态（带 TTL）
//!
//! ## 核心特性
//!
//! - **多租户隔离**：租户资源接口显式接收 `TenantContext`，确保租户数据隔离
//! - **条件转移**：行程关闭以 `status = inside` 为前置条件，终态只进一次
//! - **级联原子性**：租户停用（客户 inactive + 设备停用 + 会话吊销）单事务生效
//! - **异步支持**：基于 Tokio 的异步 I/O
//! - **可扩展性**：通过 Trait 接口支持多种存储后端
//!
//! ## 设计约束
//!
//! - **禁止直接 SQL**：Handler 层禁止直接写 SQL，统一通过 storage 层
//! - **显式上下文**：租户数据访问方法必须显式接收 `TenantContext`
//! - **审计最弱保证**：审计追加失败不向调用方传播（`AuditSink` 内吸收）

// 模块导出：将子模块的内容导出到 crate 根目录
pub mod audit;
pub mod connection;
pub mod error;
pub mod in_memory;
pub mod models;
pub mod online;
pub mod postgres;
pub mod redis;
pub mod traits;
pub mod validation;

// 导出常用类型到 crate 根目录，方便外部引用
pub use audit::{AuditEvent, AuditSink, epoch_ms_now};
pub use connection::*;
pub use error::*;
pub use models::*;
pub use online::*;
pub use redis::RedisOnlineStore;
pub use traits::*;
pub use validation::*;

// 导出内存存储实现类型
pub use in_memory::{
    InMemoryAuditLogStore, InMemoryClientStore, InMemoryDeviceStore, InMemoryOnlineStore,
    InMemoryPlanStore, InMemorySiteStore, InMemoryTenantLifecycleStore, InMemoryTripStore,
    InMemoryUserStore, InMemoryVendorStore,
};

// 导出 PostgreSQL 存储实现类型
pub use postgres::{
    PgAuditLogStore, PgClientStore, PgDeviceStore, PgPlanStore, PgSiteStore,
    PgTenantLifecycleStore, PgTripStore, PgUserStore, PgVendorStore,
};
