//! # Orchestration Watcher
//!
//! State-reconciliation core that keeps the entity store consistent with a
//! stream of orchestration lifecycle events.
//!
//! ## Architecture
//!
//! The watcher follows a **delegation-based architecture** where:
//! - **The queue provides delivery semantics**: at-least-once redelivery with
//!   visibility timeouts and its own backoff policy
//! - **The store provides consistency**: keyed persistence with whatever
//!   concurrency control it implements
//! - **The watcher provides the decision**: decode each payload, reconcile it
//!   with a find-then-create-or-update protocol, and issue exactly one
//!   terminal acknowledgment
//!
//! ## Core Components
//!
//! - **OrchestrationWatcher**: Per-message reconciliation and acknowledgment
//! - **WatcherSubscription**: Polling loop that attaches the watcher to a
//!   pgmq queue and dispatches delivered messages

pub mod subscription;
pub mod watcher;

// Re-export core types and components for easy access
pub use subscription::WatcherSubscription;
pub use watcher::{OrchestrationWatcher, ReconcileOutcome};
