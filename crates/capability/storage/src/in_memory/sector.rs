//! 分区内存存储实现
//!
//! 仅用于本地演示和测试。
//!
//! 层级唯一约束：同一矿井内不允许两个分区共用同一 level，
//! create/update 冲突时返回 StorageError::DuplicateSectorLevel。

use crate::error::StorageError;
use crate::models::{SectorRecord, SectorUpdate};
use crate::traits::SectorStore;
use crate::validation::{ensure_actor, ensure_mine_scope};
use domain::AuthContext;
use std::sync::RwLock;

/// 分区内存存储
pub struct InMemorySectorStore {
    sectors: RwLock<Vec<SectorRecord>>,
}

impl InMemorySectorStore {
    pub fn new() -> Self {
        Self {
            sectors: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemorySectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SectorStore for InMemorySectorStore {
    async fn list_sectors(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<Vec<SectorRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        let mut sectors: Vec<SectorRecord> = self
            .sectors
            .read()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|sector| sector.mine_id == mine_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sectors.sort_by_key(|sector| sector.level);
        Ok(sectors)
    }

    async fn find_sector(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<Option<SectorRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        Ok(self.sectors.read().ok().and_then(|entries| {
            entries
                .iter()
                .find(|sector| sector.mine_id == mine_id && sector.sector_id == sector_id)
                .cloned()
        }))
    }

    async fn create_sector(
        &self,
        ctx: &AuthContext,
        record: SectorRecord,
    ) -> Result<SectorRecord, StorageError> {
        ensure_actor(ctx)?;
        ensure_mine_scope(ctx, &record.mine_id)?;
        let mut sectors = self
            .sectors
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let collision = sectors
            .iter()
            .any(|sector| sector.mine_id == record.mine_id && sector.level == record.level);
        if collision {
            return Err(StorageError::DuplicateSectorLevel);
        }
        sectors.push(record.clone());
        Ok(record)
    }

    async fn update_sector(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
        update: SectorUpdate,
    ) -> Result<Option<SectorRecord>, StorageError> {
        ensure_actor(ctx)?;
        ensure_mine_scope(ctx, mine_id)?;
        let mut sectors = self
            .sectors
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if let Some(level) = update.level {
            let collision = sectors.iter().any(|sector| {
                sector.mine_id == mine_id && sector.level == level && sector.sector_id != sector_id
            });
            if collision {
                return Err(StorageError::DuplicateSectorLevel);
            }
        }
        let Some(sector) = sectors
            .iter_mut()
            .find(|sector| sector.mine_id == mine_id && sector.sector_id == sector_id)
        else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            sector.name = name;
        }
        if let Some(level) = update.level {
            sector.level = level;
        }
        if let Some(status) = update.status {
            sector.status = status;
        }
        Ok(Some(sector.clone()))
    }

    async fn delete_sector(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<bool, StorageError> {
        ensure_actor(ctx)?;
        ensure_mine_scope(ctx, mine_id)?;
        let mut sectors = self
            .sectors
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let before = sectors.len();
        sectors.retain(|sector| !(sector.mine_id == mine_id && sector.sector_id == sector_id));
        Ok(sectors.len() < before)
    }

    async fn delete_sectors_of_mine(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<i64, StorageError> {
        ensure_actor(ctx)?;
        ensure_mine_scope(ctx, mine_id)?;
        let mut sectors = self
            .sectors
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let before = sectors.len();
        sectors.retain(|sector| sector.mine_id != mine_id);
        Ok((before - sectors.len()) as i64)
    }
}
