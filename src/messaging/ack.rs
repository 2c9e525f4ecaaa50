//! # Message Acknowledgment
//!
//! Terminal acknowledgment actions for a delivered message. Each delivery
//! attempt gets exactly one terminal action: positive acknowledgment removes
//! the message from redelivery permanently, negative acknowledgment schedules
//! it for redelivery subject to the channel's own retry policy.

use async_trait::async_trait;
use std::sync::Arc;

use super::errors::MessagingResult;
use super::pgmq_client::PgmqClient;

/// Per-message acknowledgment surface consumed by the watcher.
///
/// A handle is expected to be used at most once across its surface per
/// delivery attempt; the watcher guarantees it never issues both actions.
#[async_trait]
pub trait MessageAck: Send + Sync {
    /// Positive terminal acknowledgment: permanently remove the message from
    /// the redelivery queue.
    async fn ack(&self) -> MessagingResult<()>;

    /// Negative terminal acknowledgment: request redelivery per the
    /// channel's backoff/retry-limit policy.
    async fn nak(&self) -> MessagingResult<()>;
}

/// pgmq-backed acknowledgment handle for one delivered message.
///
/// Ack deletes the message; Nak resets its visibility timeout so the queue
/// redelivers it after the configured delay.
pub struct PgmqAckHandle {
    client: Arc<PgmqClient>,
    queue_name: String,
    msg_id: i64,
    nak_delay_seconds: i32,
}

impl PgmqAckHandle {
    pub fn new(
        client: Arc<PgmqClient>,
        queue_name: impl Into<String>,
        msg_id: i64,
        nak_delay_seconds: i32,
    ) -> Self {
        Self {
            client,
            queue_name: queue_name.into(),
            msg_id,
            nak_delay_seconds,
        }
    }

    pub fn msg_id(&self) -> i64 {
        self.msg_id
    }
}

#[async_trait]
impl MessageAck for PgmqAckHandle {
    async fn ack(&self) -> MessagingResult<()> {
        self.client
            .delete_message(&self.queue_name, self.msg_id)
            .await
    }

    async fn nak(&self) -> MessagingResult<()> {
        self.client
            .set_message_visibility(&self.queue_name, self.msg_id, self.nak_delay_seconds)
            .await
    }
}
