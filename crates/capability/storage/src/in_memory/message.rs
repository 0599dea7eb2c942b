//! 站内消息内存存储实现
//!
//! 仅用于本地演示和测试。

use crate::error::StorageError;
use crate::models::MessageRecord;
use crate::traits::MessageStore;
use crate::validation::ensure_actor;
use domain::AuthContext;
use std::sync::RwLock;

/// 站内消息内存存储
pub struct InMemoryMessageStore {
    messages: RwLock<Vec<MessageRecord>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn send_message(
        &self,
        ctx: &AuthContext,
        record: MessageRecord,
    ) -> Result<MessageRecord, StorageError> {
        ensure_actor(ctx)?;
        let mut messages = self
            .messages
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        messages.push(record.clone());
        Ok(record)
    }

    async fn list_inbox(
        &self,
        _ctx: &AuthContext,
        recipient_id: &str,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        let mut messages: Vec<MessageRecord> = self
            .messages
            .read()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|message| {
                        message.recipient_id == recipient_id && (!unread_only || !message.read)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        messages.sort_by(|a, b| b.sent_at_ms.cmp(&a.sent_at_ms));
        if limit > 0 {
            messages.truncate(limit as usize);
        }
        Ok(messages)
    }

    async fn mark_read(
        &self,
        ctx: &AuthContext,
        recipient_id: &str,
        message_id: &str,
    ) -> Result<Option<MessageRecord>, StorageError> {
        ensure_actor(ctx)?;
        let mut messages = self
            .messages
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(message) = messages
            .iter_mut()
            .find(|message| message.message_id == message_id && message.recipient_id == recipient_id)
        else {
            return Ok(None);
        };
        message.read = true;
        Ok(Some(message.clone()))
    }

    async fn unread_count(
        &self,
        _ctx: &AuthContext,
        recipient_id: &str,
    ) -> Result<i64, StorageError> {
        Ok(self
            .messages
            .read()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|message| message.recipient_id == recipient_id && !message.read)
                    .count() as i64
            })
            .unwrap_or(0))
    }
}
