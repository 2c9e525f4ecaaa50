#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Provisioning Manager Core
//!
//! State-reconciliation core for a provisioning orchestration control plane.
//!
//! ## Overview
//!
//! The crate consumes orchestration lifecycle events from a durable,
//! at-least-once message stream (PostgreSQL message queues via `pgmq`) and
//! applies them to a persisted entity store, keeping the store consistent
//! with potentially out-of-order, duplicated, or malformed deliveries. Each
//! message produces exactly one terminal acknowledgment decision:
//!
//! - malformed payload → **Ack** (poison message, never redelivered)
//! - store lookup/write failure → **Nak** (redelivered per queue policy)
//! - successful create or update → **Ack**
//!
//! ## Architecture
//!
//! The watcher is deliberately small: decode, find-then-create-or-update,
//! acknowledge. Both collaborators are capability traits
//! ([`store::OrchestrationEntryStore`], [`messaging::MessageAck`]) so the
//! reconciliation core is tested in isolation and composes with whatever
//! concurrency the surrounding service chooses.
//!
//! ## Module Organization
//!
//! - [`models`] - Orchestration entry data model
//! - [`store`] - Entity store trait and PostgreSQL implementation
//! - [`messaging`] - pgmq client, acknowledgment handles, messaging errors
//! - [`orchestration`] - The watcher core and its subscription loop
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging initialization
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pmanager_core::orchestration::OrchestrationWatcher;
//! use pmanager_core::store::PgOrchestrationStore;
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(PgOrchestrationStore::new(pool));
//! let watcher = OrchestrationWatcher::new(store);
//! // watcher.on_message(payload, &handle).await drives one reconciliation
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! Unit tests run without a database; integration tests against PostgreSQL
//! are skipped unless `TEST_DATABASE_URL` is set:
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod orchestration;
pub mod store;

pub use config::{PmanagerConfig, WatcherConfig};
pub use error::{PmanagerError, Result};
pub use models::{OrchestrationEntry, OrchestrationState};
pub use orchestration::{OrchestrationWatcher, ReconcileOutcome};
pub use store::{OrchestrationEntryStore, StoreError};
