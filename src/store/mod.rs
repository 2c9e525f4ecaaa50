//! # Entity Store
//!
//! Keyed persistence for orchestration entries behind a capability trait so
//! the reconciliation core can be tested in isolation. The store is the
//! single source of truth for whether an entry exists; absence is signaled
//! through the distinguished [`StoreError::NotFound`] sentinel, which is the
//! only error kind the watcher treats as "take the creation path".

pub mod postgres;

use crate::models::OrchestrationEntry;
use async_trait::async_trait;
use thiserror::Error;

pub use postgres::PgOrchestrationStore;

/// Entity store error taxonomy
#[derive(Error, Debug)]
pub enum StoreError {
    /// Distinguished sentinel: the keyed entry does not exist. This is the
    /// only variant that redirects reconciliation to the creation branch.
    #[error("Entry not found: {id}")]
    NotFound { id: String },

    /// Opaque infrastructure/data error. Covers everything from connection
    /// failures to constraint violations and optimistic-concurrency
    /// conflicts; the watcher treats them all as retryable.
    #[error("Database error: {operation}: {message}")]
    Database { operation: String, message: String },
}

impl StoreError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn database(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Database {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// True only for the not-found sentinel. Every other error kind is an
    /// opaque retryable failure as far as the watcher is concerned.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed persistence operations for orchestration entries.
///
/// Implementations must be safe for concurrent use; the watcher never holds
/// a lock across the find/write sequence, so consistency under racing
/// deliveries for the same `id` is the implementation's concern (optimistic
/// concurrency failures surface as ordinary errors and lead to redelivery).
#[async_trait]
pub trait OrchestrationEntryStore: Send + Sync {
    /// Look up an entry by its unique key. Returns [`StoreError::NotFound`]
    /// when the key is absent.
    async fn find_by_id(&self, id: &str) -> StoreResult<OrchestrationEntry>;

    /// Persist a new entry. Fails if the key already exists.
    async fn create(&self, entry: &OrchestrationEntry) -> StoreResult<OrchestrationEntry>;

    /// Overwrite the mutable fields of an existing entry.
    async fn update(&self, entry: &OrchestrationEntry) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_sentinel_is_narrow() {
        let not_found = StoreError::not_found("orch-1");
        assert!(not_found.is_not_found());

        // Errors that superficially resemble absence must never match the
        // sentinel; conflating them would risk spurious duplicate creates.
        let database = StoreError::database("find_by_id", "no rows returned");
        assert!(!database.is_not_found());

        let conflict = StoreError::database("update", "version mismatch");
        assert!(!conflict.is_not_found());
    }

    #[test]
    fn test_taxonomy_has_exactly_one_sentinel() {
        // The taxonomy stays narrow on purpose: one sentinel for absence,
        // one opaque retryable kind for everything else. Absence itself is
        // derived by implementations (a missing row), never converted from
        // another error's surface.
        let errors = [
            StoreError::not_found("orch-1"),
            StoreError::database("create", "duplicate key"),
        ];
        let sentinels = errors.iter().filter(|e| e.is_not_found()).count();
        assert_eq!(sentinels, 1);
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::not_found("orch-42");
        assert_eq!(err.to_string(), "Entry not found: orch-42");

        let err = StoreError::database("create", "connection refused");
        assert!(err.to_string().contains("create"));
        assert!(err.to_string().contains("connection refused"));
    }
}
