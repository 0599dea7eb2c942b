//! 矿井内存存储实现
//!
//! 仅用于本地演示和测试。
//!
//! 功能：
//! - 内置默认矿井（mine-1，Demo Mine）
//! - 矿井 CRUD 操作

use crate::error::StorageError;
use crate::models::{MineRecord, MineUpdate};
use crate::traits::MineStore;
use crate::validation::ensure_actor;
use domain::AuthContext;
use std::collections::HashMap;
use std::sync::RwLock;

/// 矿井内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
pub struct InMemoryMineStore {
    mines: RwLock<HashMap<String, MineRecord>>,
}

impl InMemoryMineStore {
    /// 空存储。
    pub fn new() -> Self {
        Self {
            mines: RwLock::new(HashMap::new()),
        }
    }

    /// 内置默认矿井
    pub fn with_default_mine() -> Self {
        let mut mines = HashMap::new();
        mines.insert(
            "mine-1".to_string(),
            MineRecord {
                mine_id: "mine-1".to_string(),
                name: "Demo Mine".to_string(),
                location: "Katowice".to_string(),
                status: "active".to_string(),
                latitude: 50.2649,
                longitude: 19.0238,
                depth_m: 320.0,
            },
        );
        Self {
            mines: RwLock::new(mines),
        }
    }
}

impl Default for InMemoryMineStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MineStore for InMemoryMineStore {
    async fn list_mines(&self, _ctx: &AuthContext) -> Result<Vec<MineRecord>, StorageError> {
        let mut mines: Vec<MineRecord> = self
            .mines
            .read()
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default();
        mines.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(mines)
    }

    async fn find_mine(
        &self,
        _ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<Option<MineRecord>, StorageError> {
        Ok(self
            .mines
            .read()
            .ok()
            .and_then(|map| map.get(mine_id).cloned()))
    }

    async fn create_mine(
        &self,
        ctx: &AuthContext,
        record: MineRecord,
    ) -> Result<MineRecord, StorageError> {
        ensure_actor(ctx)?;
        let mut mines = self
            .mines
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        mines.insert(record.mine_id.clone(), record.clone());
        Ok(record)
    }

    async fn update_mine(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        update: MineUpdate,
    ) -> Result<Option<MineRecord>, StorageError> {
        ensure_actor(ctx)?;
        let mut mines = self
            .mines
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(mine) = mines.get_mut(mine_id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            mine.name = name;
        }
        if let Some(location) = update.location {
            mine.location = location;
        }
        if let Some(status) = update.status {
            mine.status = status;
        }
        if let Some(latitude) = update.latitude {
            mine.latitude = latitude;
        }
        if let Some(longitude) = update.longitude {
            mine.longitude = longitude;
        }
        if let Some(depth_m) = update.depth_m {
            mine.depth_m = depth_m;
        }
        Ok(Some(mine.clone()))
    }

    async fn delete_mine(&self, ctx: &AuthContext, mine_id: &str) -> Result<bool, StorageError> {
        ensure_actor(ctx)?;
        let mut mines = self
            .mines
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(mines.remove(mine_id).is_some())
    }

    async fn mine_exists(&self, _ctx: &AuthContext, mine_id: &str) -> Result<bool, StorageError> {
        Ok(self
            .mines
            .read()
            .map(|map| map.contains_key(mine_id))
            .unwrap_or(false))
    }
}
