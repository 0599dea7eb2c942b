//! Handlers 模块

pub mod alerts;
pub mod audit;
pub mod auth;
pub mod messages;
pub mod metrics;
pub mod mines;
pub mod rbac;
pub mod reports;
pub mod sectors;
pub mod sensors;
pub mod status;

pub use alerts::*;
pub use audit::*;
pub use auth::*;
pub use messages::*;
pub use metrics::*;
pub use mines::*;
pub use rbac::*;
pub use reports::*;
pub use sectors::*;
pub use sensors::*;
pub use status::*;
