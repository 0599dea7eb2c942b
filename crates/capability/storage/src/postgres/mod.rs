//! PostgreSQL 存储实现模块
//!
//! 生产环境使用。所有 SQL 使用参数绑定，禁止拼接。
//!
//! 包含以下实现：
//! - UserStore + RbacStore: PgUserStore
//! - MineStore: PgMineStore
//! - SectorStore: PgSectorStore
//! - SensorStore: PgSensorStore
//! - AlertStore: PgAlertStore
//! - MessageStore: PgMessageStore
//! - AuditLogStore: PgAuditLogStore

pub mod alert;
pub mod audit;
pub mod message;
pub mod mine;
pub mod sector;
pub mod sensor;
pub mod user;

pub use alert::PgAlertStore;
pub use audit::PgAuditLogStore;
pub use message::PgMessageStore;
pub use mine::PgMineStore;
pub use sector::PgSectorStore;
pub use sensor::PgSensorStore;
pub use user::PgUserStore;
