//! # Messaging Module
//!
//! PostgreSQL message queue (pgmq) based messaging for the orchestration
//! watcher. Provides the queue client, the per-message acknowledgment
//! capability, and the messaging error taxonomy.

pub mod ack;
pub mod errors;
pub mod pgmq_client;

pub use ack::{MessageAck, PgmqAckHandle};
pub use errors::{MessagingError, MessagingResult};
pub use pgmq_client::PgmqClient;
