//! # PostgreSQL Message Queue Client (pgmq-rs)
//!
//! Rust client using the pgmq-rs crate for queue operations. The client is
//! the delivery channel collaborator: it reads batches for the watcher and
//! backs the terminal Ack/Nak actions (delete and visibility reset).

use pgmq::{types::Message, PGMQueue};
use tracing::{debug, info, warn};

use super::errors::{MessagingError, MessagingResult};

/// pgmq-rs based message queue client
#[derive(Debug, Clone)]
pub struct PgmqClient {
    pgmq: PGMQueue,
}

impl PgmqClient {
    /// Create new pgmq client using connection string
    pub async fn new(database_url: &str) -> MessagingResult<Self> {
        info!("Connecting to pgmq");

        let pgmq = PGMQueue::new(database_url.to_string()).await?;

        info!("Connected to pgmq");
        Ok(Self { pgmq })
    }

    /// Create new pgmq client using existing connection pool (BYOP - Bring Your Own Pool)
    pub async fn new_with_pool(pool: sqlx::PgPool) -> Self {
        debug!("Creating pgmq client with shared connection pool");

        let pgmq = PGMQueue::new_with_pool(pool).await;

        Self { pgmq }
    }

    /// Create queue if it doesn't exist
    pub async fn create_queue(&self, queue_name: &str) -> MessagingResult<()> {
        debug!("Creating queue: {}", queue_name);

        self.pgmq.create(queue_name).await.map_err(|e| {
            MessagingError::queue_operation(queue_name, "create", e.to_string())
        })?;

        info!("Queue created: {}", queue_name);
        Ok(())
    }

    /// Send generic JSON message to queue
    pub async fn send_json_message<T: serde::Serialize>(
        &self,
        queue_name: &str,
        message: &T,
    ) -> MessagingResult<i64> {
        debug!("Sending JSON message to queue: {}", queue_name);

        let serialized = serde_json::to_value(message)?;
        let message_id = self.pgmq.send(queue_name, &serialized).await.map_err(|e| {
            MessagingError::queue_operation(queue_name, "send", e.to_string())
        })?;

        debug!(
            "JSON message sent to queue: {} with id: {}",
            queue_name, message_id
        );
        Ok(message_id)
    }

    /// Read messages from queue
    pub async fn read_messages(
        &self,
        queue_name: &str,
        vt: Option<i32>, // visibility timeout
        limit: Option<i32>,
    ) -> MessagingResult<Vec<Message<serde_json::Value>>> {
        debug!(
            "Reading messages from queue: {} (limit: {:?})",
            queue_name, limit
        );

        let messages = match limit {
            Some(l) => self
                .pgmq
                .read_batch(queue_name, vt, l)
                .await
                .map_err(|e| {
                    MessagingError::queue_operation(queue_name, "read_batch", e.to_string())
                })?
                .unwrap_or_default(),
            None => match self.pgmq.read(queue_name, vt).await.map_err(|e| {
                MessagingError::queue_operation(queue_name, "read", e.to_string())
            })? {
                Some(msg) => vec![msg],
                None => vec![],
            },
        };

        debug!(
            "Read {} messages from queue: {}",
            messages.len(),
            queue_name
        );
        Ok(messages)
    }

    /// Delete message from queue (permanent removal from redelivery)
    pub async fn delete_message(&self, queue_name: &str, message_id: i64) -> MessagingResult<()> {
        debug!(
            "Deleting message {} from queue: {}",
            message_id, queue_name
        );

        self.pgmq.delete(queue_name, message_id).await.map_err(|e| {
            MessagingError::queue_operation(queue_name, "delete", e.to_string())
        })?;

        debug!("Message deleted: {}", message_id);
        Ok(())
    }

    /// Archive message (move to archive table)
    pub async fn archive_message(&self, queue_name: &str, message_id: i64) -> MessagingResult<()> {
        debug!(
            "Archiving message {} from queue: {}",
            message_id, queue_name
        );

        self.pgmq
            .archive(queue_name, message_id)
            .await
            .map_err(|e| {
                MessagingError::queue_operation(queue_name, "archive", e.to_string())
            })?;

        debug!("Message archived: {}", message_id);
        Ok(())
    }

    /// Reset a message's visibility timeout so it becomes redeliverable after
    /// `delay_seconds`. This backs negative acknowledgment: the message stays
    /// in the queue and the channel's own retry policy takes over.
    pub async fn set_message_visibility(
        &self,
        queue_name: &str,
        message_id: i64,
        delay_seconds: i32,
    ) -> MessagingResult<()> {
        debug!(
            "Rescheduling message {} on queue {} for redelivery in {}s",
            message_id, queue_name, delay_seconds
        );

        sqlx::query("SELECT msg_id FROM pgmq.set_vt($1, $2, $3)")
            .bind(queue_name)
            .bind(message_id)
            .bind(delay_seconds)
            .fetch_optional(&self.pgmq.connection)
            .await
            .map_err(|e| MessagingError::queue_operation(queue_name, "set_vt", e.to_string()))?;

        Ok(())
    }

    /// Purge queue (delete all messages)
    pub async fn purge_queue(&self, queue_name: &str) -> MessagingResult<u64> {
        warn!("Purging queue: {}", queue_name);

        let purged_count = self.pgmq.purge(queue_name).await.map_err(|e| {
            MessagingError::queue_operation(queue_name, "purge", e.to_string())
        })?;

        warn!(
            "Purged {} messages from queue: {}",
            purged_count, queue_name
        );
        Ok(purged_count)
    }

    /// Drop queue completely
    pub async fn drop_queue(&self, queue_name: &str) -> MessagingResult<()> {
        warn!("Dropping queue: {}", queue_name);

        self.pgmq.destroy(queue_name).await.map_err(|e| {
            MessagingError::queue_operation(queue_name, "destroy", e.to_string())
        })?;

        Ok(())
    }

    /// Get reference to underlying connection pool for advanced operations
    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pgmq.connection
    }
}
