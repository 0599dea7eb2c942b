pub mod data;
pub mod permissions;
pub mod status;

pub use data::{CalibratedReading, RawReading};
pub use status::{AlertSeverity, MonitoredEntity, SensorType, StatusTier};

/// 执行上下文：经过认证后所有模块共享的操作者身份。
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub username: String,
    pub mine_scope: Option<String>,
}

impl AuthContext {
    /// 构造显式身份与矿井作用域的上下文。
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        mine_scope: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            mine_scope,
        }
    }

    /// 系统内部动作（采集/监测后台任务）使用的上下文。
    pub fn system() -> Self {
        Self {
            user_id: "system".to_string(),
            username: "system".to_string(),
            mine_scope: None,
        }
    }
}

impl Default for AuthContext {
    /// 空上下文（仅用于测试或占位）。
    fn default() -> Self {
        Self {
            user_id: "".to_string(),
            username: "".to_string(),
            mine_scope: None,
        }
    }
}
