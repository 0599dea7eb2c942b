//! 存储层错误类型
//!
//! 统一封装底层错误，并区分两类业务上必须可辨识的冲突：
//! - DuplicateSectorLevel：同一矿井内分区层级重复（校验失败，可恢复）
//! - DuplicateOpenAlert：同一实体同一严重级已存在未确认告警
//!   （并发去抖竞态的落败方，调用侧按成功空操作处理）

#[derive(Debug)]
pub enum StorageError {
    /// 分区层级在矿井内重复。
    DuplicateSectorLevel,
    /// 同一 (entity_key, severity) 已存在未确认告警。
    DuplicateOpenAlert,
    /// 其余底层错误（SQL、连接、序列化）。
    Internal(String),
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        StorageError::Internal(message.into())
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::DuplicateSectorLevel => write!(f, "sector level already used in mine"),
            StorageError::DuplicateOpenAlert => {
                write!(f, "open alert already exists for entity and severity")
            }
            StorageError::Internal(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.constraint() {
                Some("sectors_mine_level_key") => return StorageError::DuplicateSectorLevel,
                Some("alerts_open_entity_severity_key") => {
                    return StorageError::DuplicateOpenAlert;
                }
                _ => {}
            }
        }
        StorageError::Internal(err.to_string())
    }
}
