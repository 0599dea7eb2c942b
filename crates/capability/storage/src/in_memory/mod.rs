//! 内存存储实现模块
//!
//! 仅用于本地演示和测试。
//!
//! 包含以下实现：
//! - UserStore + RbacStore: InMemoryUserStore
//! - MineStore: InMemoryMineStore
//! - SectorStore: InMemorySectorStore
//! - SensorStore: InMemorySensorStore
//! - AlertStore: InMemoryAlertStore
//! - MessageStore: InMemoryMessageStore
//! - RealtimeStore: InMemoryRealtimeStore
//! - AuditLogStore: InMemoryAuditLogStore

pub mod alert;
pub mod audit;
pub mod message;
pub mod mine;
pub mod realtime;
pub mod sector;
pub mod sensor;
pub mod user;

pub use alert::*;
pub use audit::*;
pub use message::*;
pub use mine::*;
pub use realtime::*;
pub use sector::*;
pub use sensor::*;
pub use user::*;
