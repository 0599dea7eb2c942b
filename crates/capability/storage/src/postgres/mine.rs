//! Postgres 矿井存储实现

use crate::error::StorageError;
use crate::models::{MineRecord, MineUpdate};
use crate::traits::MineStore;
use domain::AuthContext;
use sqlx::{PgPool, Row};

pub struct PgMineStore {
    pub pool: PgPool,
}

impl PgMineStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<MineRecord, StorageError> {
        Ok(MineRecord {
            mine_id: row.try_get("mine_id")?,
            name: row.try_get("name")?,
            location: row.try_get("location")?,
            status: row.try_get("status")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            depth_m: row.try_get("depth_m")?,
        })
    }
}

#[async_trait::async_trait]
impl MineStore for PgMineStore {
    async fn list_mines(&self, _ctx: &AuthContext) -> Result<Vec<MineRecord>, StorageError> {
        let rows = sqlx::query(
            "select mine_id, name, location, status, latitude, longitude, depth_m \
             from mines order by name asc",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut mines = Vec::with_capacity(rows.len());
        for row in rows {
            mines.push(Self::row_to_record(&row)?);
        }
        Ok(mines)
    }

    async fn find_mine(
        &self,
        _ctx: &AuthContext,
        mine_id: &str,
    ) -> Result<Option<MineRecord>, StorageError> {
        let row = sqlx::query(
            "select mine_id, name, location, status, latitude, longitude, depth_m \
             from mines where mine_id = $1",
        )
        .bind(mine_id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_mine(
        &self,
        _ctx: &AuthContext,
        record: MineRecord,
    ) -> Result<MineRecord, StorageError> {
        sqlx::query(
            "insert into mines (mine_id, name, location, status, latitude, longitude, depth_m) \
             values ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&record.mine_id)
        .bind(&record.name)
        .bind(&record.location)
        .bind(&record.status)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.depth_m)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn update_mine(
        &self,
        _ctx: &AuthContext,
        mine_id: &str,
        update: MineUpdate,
    ) -> Result<Option<MineRecord>, StorageError> {
        let row = sqlx::query(
            "update mines set name = coalesce($2, name), location = coalesce($3, location), \
             status = coalesce($4, status), latitude = coalesce($5, latitude), \
             longitude = coalesce($6, longitude), depth_m = coalesce($7, depth_m) \
             where mine_id = $1 \
             returning mine_id, name, location, status, latitude, longitude, depth_m",
        )
        .bind(mine_id)
        .bind(update.name)
        .bind(update.location)
        .bind(update.status)
        .bind(update.latitude)
        .bind(update.longitude)
        .bind(update.depth_m)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_mine(&self, _ctx: &AuthContext, mine_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("delete from mines where mine_id = $1")
            .bind(mine_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mine_exists(&self, _ctx: &AuthContext, mine_id: &str) -> Result<bool, StorageError> {
        let exists: Option<i32> = sqlx::query_scalar("select 1 from mines where mine_id = $1")
            .bind(mine_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(exists.is_some())
    }
}
