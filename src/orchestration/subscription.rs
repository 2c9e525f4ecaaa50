//! # Watcher Subscription
//!
//! Polling loop that attaches an [`OrchestrationWatcher`] to a pgmq queue.
//! Each delivered message is dispatched to `on_message` with a pgmq-backed
//! acknowledgment handle; the loop sleeps the configured interval when the
//! queue is empty and exits when the shutdown signal flips.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument};

use super::watcher::OrchestrationWatcher;
use crate::config::WatcherConfig;
use crate::error::{PmanagerError, Result};
use crate::messaging::{PgmqAckHandle, PgmqClient};

/// Subscription binding a watcher to one orchestration event queue
pub struct WatcherSubscription {
    pgmq_client: Arc<PgmqClient>,
    watcher: Arc<OrchestrationWatcher>,
    config: WatcherConfig,
}

impl WatcherSubscription {
    pub fn new(
        pgmq_client: Arc<PgmqClient>,
        watcher: Arc<OrchestrationWatcher>,
        config: WatcherConfig,
    ) -> Self {
        Self {
            pgmq_client,
            watcher,
            config,
        }
    }

    /// Create the subscribed queue if it does not exist yet
    pub async fn initialize_queue(&self) -> Result<()> {
        self.pgmq_client
            .create_queue(&self.config.queue_name)
            .await
            .map_err(|e| {
                PmanagerError::MessagingError(format!(
                    "Failed to create queue {}: {e}",
                    self.config.queue_name
                ))
            })
    }

    /// Run the polling loop until `shutdown` observes `true`.
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            queue = %self.config.queue_name,
            poll_interval_ms = self.config.poll_interval_ms,
            batch_size = self.config.batch_size,
            "Starting orchestration watcher subscription"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.poll_once().await {
                Ok(processed_count) => {
                    if processed_count == 0 {
                        // No messages delivered, wait before polling again
                        if self.idle(&mut shutdown).await {
                            break;
                        }
                    }
                    // If we processed messages, continue immediately for better throughput
                }
                Err(e) => {
                    error!(error = %e, "Error reading orchestration event batch");
                    if self.idle(&mut shutdown).await {
                        break;
                    }
                }
            }
        }

        info!(queue = %self.config.queue_name, "Orchestration watcher subscription stopped");
        Ok(())
    }

    /// Sleep one poll interval, waking early on a shutdown change. Returns
    /// true when the loop should exit (signal flipped or sender dropped).
    async fn idle(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        tokio::select! {
            _ = sleep(Duration::from_millis(self.config.poll_interval_ms)) => false,
            changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
        }
    }

    /// Read one batch from the queue and dispatch each message to the watcher.
    /// Returns the number of messages delivered to `on_message`.
    pub async fn poll_once(&self) -> Result<usize> {
        let messages = self
            .pgmq_client
            .read_messages(
                &self.config.queue_name,
                Some(self.config.visibility_timeout_seconds),
                Some(self.config.batch_size),
            )
            .await
            .map_err(|e| {
                PmanagerError::MessagingError(format!("Failed to read orchestration events: {e}"))
            })?;

        if messages.is_empty() {
            return Ok(0);
        }

        let message_count = messages.len();
        debug!(
            message_count = message_count,
            queue = %self.config.queue_name,
            "Dispatching batch of orchestration events"
        );

        for message in messages {
            let handle = PgmqAckHandle::new(
                Arc::clone(&self.pgmq_client),
                self.config.queue_name.clone(),
                message.msg_id,
                self.config.nak_redelivery_delay_seconds,
            );

            // The payload arrives as JSON; on_message re-validates the shape
            // against the entry model and owns the acknowledgment decision.
            let payload = message.message.to_string();
            self.watcher.on_message(payload.as_bytes(), &handle).await;
        }

        Ok(message_count)
    }
}
