//! Postgres 站内消息存储实现

use crate::error::StorageError;
use crate::models::MessageRecord;
use crate::traits::MessageStore;
use domain::AuthContext;
use sqlx::{PgPool, Row};

const MESSAGE_COLUMNS: &str =
    "message_id, sender_id, sender_name, recipient_id, subject, body, sent_at_ms, read";

pub struct PgMessageStore {
    pub pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<MessageRecord, StorageError> {
        Ok(MessageRecord {
            message_id: row.try_get("message_id")?,
            sender_id: row.try_get("sender_id")?,
            sender_name: row.try_get("sender_name")?,
            recipient_id: row.try_get("recipient_id")?,
            subject: row.try_get("subject")?,
            body: row.try_get("body")?,
            sent_at_ms: row.try_get("sent_at_ms")?,
            read: row.try_get("read")?,
        })
    }
}

#[async_trait::async_trait]
impl MessageStore for PgMessageStore {
    async fn send_message(
        &self,
        _ctx: &AuthContext,
        record: MessageRecord,
    ) -> Result<MessageRecord, StorageError> {
        sqlx::query(
            "insert into messages (message_id, sender_id, sender_name, recipient_id, subject, \
             body, sent_at_ms, read) values ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&record.message_id)
        .bind(&record.sender_id)
        .bind(&record.sender_name)
        .bind(&record.recipient_id)
        .bind(&record.subject)
        .bind(&record.body)
        .bind(record.sent_at_ms)
        .bind(record.read)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_inbox(
        &self,
        _ctx: &AuthContext,
        recipient_id: &str,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        let limit = if limit > 0 { limit } else { 100 };
        let rows = sqlx::query(&format!(
            "select {MESSAGE_COLUMNS} from messages \
             where recipient_id = $1 and (not $2 or not read) \
             order by sent_at_ms desc limit $3"
        ))
        .bind(recipient_id)
        .bind(unread_only)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        let mut messages = Vec::with_capacity(rows.len());
        for row in rows {
            messages.push(Self::row_to_record(&row)?);
        }
        Ok(messages)
    }

    async fn mark_read(
        &self,
        _ctx: &AuthContext,
        recipient_id: &str,
        message_id: &str,
    ) -> Result<Option<MessageRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "update messages set read = true \
             where message_id = $1 and recipient_id = $2 \
             returning {MESSAGE_COLUMNS}"
        ))
        .bind(message_id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn unread_count(
        &self,
        _ctx: &AuthContext,
        recipient_id: &str,
    ) -> Result<i64, StorageError> {
        let count: i64 = sqlx::query_scalar(
            "select count(*) from messages where recipient_id = $1 and not read",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
