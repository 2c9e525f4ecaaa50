use crate::error::{PmanagerError, Result};

/// Top-level configuration for the reconciliation core.
#[derive(Debug, Clone)]
pub struct PmanagerConfig {
    pub database_url: String,
    pub watcher: WatcherConfig,
}

/// Configuration for the orchestration watcher subscription loop.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Queue the watcher subscribes to
    pub queue_name: String,
    /// Polling interval when the queue is empty (milliseconds)
    pub poll_interval_ms: u64,
    /// Number of messages to read per poll
    pub batch_size: i32,
    /// Visibility timeout for in-flight messages (seconds)
    pub visibility_timeout_seconds: i32,
    /// Delay before a negatively acknowledged message becomes visible again (seconds)
    pub nak_redelivery_delay_seconds: i32,
}

impl Default for PmanagerConfig {
    fn default() -> Self {
        Self {
            database_url: "postgresql://localhost/pmanager_development".to_string(),
            watcher: WatcherConfig::default(),
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            queue_name: "orchestration_events".to_string(),
            poll_interval_ms: 1000,
            batch_size: 10,
            visibility_timeout_seconds: 30,
            nak_redelivery_delay_seconds: 5,
        }
    }
}

impl PmanagerConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(db_url) = std::env::var("DATABASE_URL") {
            config.database_url = db_url;
        }

        if let Ok(queue_name) = std::env::var("PMANAGER_ORCHESTRATION_QUEUE") {
            config.watcher.queue_name = queue_name;
        }

        if let Ok(poll_interval) = std::env::var("PMANAGER_POLL_INTERVAL_MS") {
            config.watcher.poll_interval_ms = poll_interval.parse().map_err(|e| {
                PmanagerError::ConfigurationError(format!("Invalid poll_interval_ms: {e}"))
            })?;
        }

        if let Ok(batch_size) = std::env::var("PMANAGER_BATCH_SIZE") {
            config.watcher.batch_size = batch_size.parse().map_err(|e| {
                PmanagerError::ConfigurationError(format!("Invalid batch_size: {e}"))
            })?;
        }

        if let Ok(vt) = std::env::var("PMANAGER_VISIBILITY_TIMEOUT_SECONDS") {
            config.watcher.visibility_timeout_seconds = vt.parse().map_err(|e| {
                PmanagerError::ConfigurationError(format!("Invalid visibility_timeout_seconds: {e}"))
            })?;
        }

        if let Ok(delay) = std::env::var("PMANAGER_NAK_REDELIVERY_DELAY_SECONDS") {
            config.watcher.nak_redelivery_delay_seconds = delay.parse().map_err(|e| {
                PmanagerError::ConfigurationError(format!(
                    "Invalid nak_redelivery_delay_seconds: {e}"
                ))
            })?;
        }

        Ok(config)
    }
}
