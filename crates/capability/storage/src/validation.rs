//! 验证辅助函数
//!
//! 提供统一的验证逻辑，确保数据一致性：
//! - ensure_actor：验证操作者身份非空
//! - ensure_mine_scope：验证矿井作用域（若上下文已绑定作用域）
//!
//! 使用场景：
//! - 所有写操作前验证操作者上下文
//! - 矿井级资源访问前验证作用域一致

use crate::error::StorageError;
use domain::AuthContext;

/// 验证操作者身份非空
pub fn ensure_actor(ctx: &AuthContext) -> Result<(), StorageError> {
    if ctx.user_id.is_empty() {
        return Err(StorageError::new("user_id required"));
    }
    Ok(())
}

/// 验证矿井作用域
///
/// 上下文绑定了矿井作用域时，访问的 mine_id 必须与之一致。
pub fn ensure_mine_scope(ctx: &AuthContext, mine_id: &str) -> Result<(), StorageError> {
    if let Some(scope) = ctx.mine_scope.as_deref() {
        if scope != mine_id {
            return Err(StorageError::new("mine scope mismatch"));
        }
    }
    Ok(())
}
