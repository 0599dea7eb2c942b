//! # Minemon Storage 模块
//!
//! 本模块提供统一的数据存储抽象层，支持多种存储后端实现。
//!
//! ## 架构设计
//!
//! 该模块采用分层架构，遵循以下原则：
//!
//! 1. **接口抽象层** (`traits.rs`)：定义所有资源存储的异步 Trait 接口
//! 2. **数据模型层** (`models.rs`)：定义存储相关的数据结构
//! 3. **错误处理层** (`error.rs`)：统一的存储错误类型（含可辨识冲突）
//! 4. **验证辅助层** (`validation.rs`)：操作者与矿井作用域验证
//! 5. **连接管理层** (`connection.rs`)：数据库连接池管理
//! 6. **实现层**：
//!    - `in_memory/`：内存存储实现（用于测试和演示）
//!    - `postgres/`：PostgreSQL 存储实现（生产环境使用）
//!    - `redis.rs`：Redis 实时读数缓存（传感器最新读数与分层）
//!
//! ## 核心特性
//!
//! - **显式上下文**：所有存储接口都显式接收 `AuthContext`
//! - **可辨识冲突**：分区层级冲突与未确认告警重复是带类型的错误变体，
//!   调用侧可以把它们与普通故障区分处理
//! - **异步支持**：基于 Tokio 的异步 I/O，支持高并发场景
//! - **可扩展性**：通过 Trait 接口支持多种存储后端
//!
//! ## 一致性约束
//!
//! - **分区层级**：同一矿井内 level 唯一；Postgres 由唯一索引
//!   `sectors_mine_level_key` 承担，内存实现显式检查
//! - **未确认告警**：同一 (entity_key, severity) 只允许一条未确认记录；
//!   Postgres 由部分唯一索引 `alerts_open_entity_severity_key` 承担，
//!   并发竞态的落败方拿到 `DuplicateOpenAlert`，按成功空操作处理
//! - **角色权限替换**：Postgres 单事务 delete + insert；内存实现写锁内
//!   整体换掉 Vec，读者只会看到旧集或新集
//!
//! ## 设计约束
//!
//! - **禁止直接 SQL**：Handler 层禁止直接写 SQL，统一通过 storage 层
//! - **权限不落用户**：用户记录只持有 role_code 引用，权限永远在读取时
//!   从角色 + 分区覆盖推导
//! - **告警软生命周期**：告警只追加与确认，核心永不删除

// 模块导出：将子模块的内容导出到 crate 根目录
pub mod connection;
pub mod error;
pub mod in_memory;
pub mod models;
pub mod postgres;
pub mod redis;
pub mod traits;
pub mod validation;

// 导出常用类型到 crate 根目录，方便外部引用
pub use connection::*;
pub use error::*;
pub use models::*;
pub use redis::RedisRealtimeStore;
pub use traits::*;
pub use validation::*;

// 导出内存存储实现类型
pub use in_memory::{
    InMemoryAlertStore, InMemoryAuditLogStore, InMemoryMessageStore, InMemoryMineStore,
    InMemoryRealtimeStore, InMemorySectorStore, InMemorySensorStore, InMemoryUserStore,
};

// 导出 PostgreSQL 存储实现类型
pub use postgres::{
    PgAlertStore, PgAuditLogStore, PgMessageStore, PgMineStore, PgSectorStore, PgSensorStore,
    PgUserStore,
};
