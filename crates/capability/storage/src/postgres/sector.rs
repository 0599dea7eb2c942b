//! Postgres 分区存储实现
//!
//! 层级唯一约束由数据库唯一索引 sectors_mine_level_key (mine_id, level) 承担，
//! 冲突经 From<sqlx::Error> 映射为 StorageError::DuplicateSectorLevel。

use crate::error::StorageError;
use crate::models::{SectorRecord, SectorUpdate};
use crate::traits::SectorStore;
use crate::validation::ensure_mine_scope;
use domain::AuthContext;
use sqlx::{PgPool, Row};

pub struct PgSectorStore {
    pub pool: PgPool,
}

impl PgSectorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<SectorRecord, StorageError> {
        Ok(SectorRecord {
            sector_id: row.try_get("sector_id")?,
            mine_id: row.try_get("mine_id")?,
            name: row.try_get("name")?,
            level: row.try_get("level")?,
            status: row.try_get("status")?,
        })
    }
}

#[async_trait::async_trait]
impl SectorStore for PgSectorStore {
    async fn list_sectors(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<Vec<SectorRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        let rows = sqlx::query(
            "select sector_id, mine_id, name, level, status from sectors \
             where mine_id = $1 order by level asc",
        )
        .bind(mine_id)
        .fetch_all(&self.pool)
        .await?;
        let mut sectors = Vec::with_capacity(rows.len());
        for row in rows {
            sectors.push(Self::row_to_record(&row)?);
        }
        Ok(sectors)
    }

    async fn find_sector(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<Option<SectorRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        let row = sqlx::query(
            "select sector_id, mine_id, name, level, status from sectors \
             where mine_id = $1 and sector_id = $2",
        )
        .bind(mine_id)
        .bind(sector_id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_sector(
        &self,
        ctx: &AuthContext,
        record: SectorRecord,
    ) -> Result<SectorRecord, StorageError> {
        ensure_mine_scope(ctx, &record.mine_id)?;
        sqlx::query(
            "insert into sectors (sector_id, mine_id, name, level, status) \
             values ($1, $2, $3, $4, $5)",
        )
        .bind(&record.sector_id)
        .bind(&record.mine_id)
        .bind(&record.name)
        .bind(record.level)
        .bind(&record.status)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn update_sector(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
        update: SectorUpdate,
    ) -> Result<Option<SectorRecord>, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        let row = sqlx::query(
            "update sectors set name = coalesce($3, name), level = coalesce($4, level), \
             status = coalesce($5, status) \
             where mine_id = $1 and sector_id = $2 \
             returning sector_id, mine_id, name, level, status",
        )
        .bind(mine_id)
        .bind(sector_id)
        .bind(update.name)
        .bind(update.level)
        .bind(update.status)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_sector(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
        sector_id: &str,
    ) -> Result<bool, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        let result = sqlx::query("delete from sectors where mine_id = $1 and sector_id = $2")
            .bind(mine_id)
            .bind(sector_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_sectors_of_mine(
        &self,
        ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<i64, StorageError> {
        ensure_mine_scope(ctx, mine_id)?;
        let result = sqlx::query("delete from sectors where mine_id = $1")
            .bind(mine_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() as i64)
    }
}
