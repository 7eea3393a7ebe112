//! # PostgreSQL 存储实现模块
//!
//! 本模块提供所有存储接口的 PostgreSQL 实现，用于生产环境。
//!
//! ## 设计原则
//!
//! 1. **参数化查询**：所有 SQL 查询使用参数绑定，防止 SQL 注入攻击
//! 2. **多租户隔离**：租户资源查询都包含 `tenant_id` 过滤条件
//! 3. **条件写入**：行程关闭用 `status = 'inside'` 前置条件保证终态只进一次
//! 4. **级联事务**：租户停用级联在单个事务内完成（全成或全不成）
//! 5. **连接池管理**：使用连接池复用数据库连接（`connection.rs`，最大 8）
//!
//! ## 数据库模式要求
//!
//! - `plans`：套餐目录（plan_code, name, 五项限额列）
//! - `clients`：客户表（client_id, name, status, plan_code, 限额快照列）
//! - `sites`：站点表（site_id, tenant_id, name, address）
//! - `vendors`：承运商表（vendor_id, tenant_id, name, contact)
//! - `devices`：设备表（device_id, tenant_id, site_id, name, device_type, serial, enabled）
//! - `users`：用户表（user_id, tenant_id, username, password_hash, role, status, permissions, refresh_jti）
//! - `trips`：行程表（trip_id, tenant_id, site_id, vendor_id, plate_text, load_status,
//!   status, entry_at_ms, entry_media jsonb, exit_at_ms, exit_media jsonb, opened_by, closed_by）
//! - `audit_logs`：审计表（audit_id, tenant_id, actor, role, action, module,
//!   old_value jsonb, new_value jsonb, origin, ts_ms）
//!
//! 建议索引：`(tenant_id)` 于各租户表、`(tenant_id, device_type, enabled)` 于 devices、
//! `(tenant_id, site_id, entry_at_ms)` 于 trips、`(ts_ms)` 于 audit_logs（留存清理）。

pub mod audit;
pub mod cascade;
pub mod client;
pub mod device;
pub mod plan;
pub mod site;
pub mod trip;
pub mod user;
pub mod vendor;

pub use audit::*;
pub use cascade::*;
pub use client::*;
pub use device::*;
pub use plan::*;
pub use site::*;
pub use trip::*;
pub use user::*;
pub use vendor::*;
