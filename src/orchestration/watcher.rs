//! # Orchestration Watcher
//!
//! Per-message reconciliation core. Each delivered payload is decoded into an
//! [`OrchestrationEntry`], synchronized against the store with a
//! find-then-create-or-update protocol, and closed with exactly one terminal
//! acknowledgment:
//!
//! - decode failure → Ack (poison message, redelivery can never succeed)
//! - lookup failure other than not-found → Nak (no write attempted)
//! - create or update failure → Nak
//! - success → Ack
//!
//! The protocol is idempotent under at-least-once redelivery: a redelivered
//! event after a successful run finds the entry and re-applies the same
//! desired state; a redelivery after a failed run starts the decision from
//! scratch, since no partial state survives an invocation.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::messaging::MessageAck;
use crate::models::OrchestrationEntry;
use crate::store::{OrchestrationEntryStore, StoreError};

/// Which reconciliation path produced a success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created,
    Updated,
}

/// Watcher that applies orchestration lifecycle events to the entity store.
///
/// Invocations of [`on_message`](Self::on_message) are independent and
/// reentrant; the only shared state is the store handle, which is safe for
/// concurrent use by contract.
pub struct OrchestrationWatcher {
    store: Arc<dyn OrchestrationEntryStore>,
}

impl OrchestrationWatcher {
    pub fn new(store: Arc<dyn OrchestrationEntryStore>) -> Self {
        Self { store }
    }

    /// Process one delivered payload and issue its terminal acknowledgment.
    ///
    /// Returns only after the acknowledgment decision has been issued. No
    /// error is raised to the caller; all failure information flows through
    /// the Ack/Nak decision plus structured logs.
    pub async fn on_message(&self, payload: &[u8], handle: &dyn MessageAck) {
        let entry = match serde_json::from_slice::<OrchestrationEntry>(payload) {
            Ok(entry) => entry,
            Err(e) => {
                // Poison message: redelivery can never succeed, so remove it
                // from the queue instead of retrying forever.
                error!(
                    error = %e,
                    payload_len = payload.len(),
                    "Discarding malformed orchestration event"
                );
                self.acknowledge(handle).await;
                return;
            }
        };

        match self.reconcile(&entry).await {
            Ok(outcome) => {
                info!(
                    entry_id = %entry.id,
                    correlation_id = %entry.correlation_id,
                    state = %entry.state,
                    outcome = ?outcome,
                    "Reconciled orchestration entry"
                );
                self.acknowledge(handle).await;
            }
            Err(e) => {
                error!(
                    entry_id = %entry.id,
                    correlation_id = %entry.correlation_id,
                    error = %e,
                    "Failed to reconcile orchestration entry, requesting redelivery"
                );
                self.negative_acknowledge(handle).await;
            }
        }
    }

    /// Synchronize the store to the desired state carried by the event.
    ///
    /// Only the store's not-found sentinel selects the creation branch; every
    /// other lookup error short-circuits with no write attempted. Conflating
    /// other error kinds with absence would risk duplicate-create attempts.
    async fn reconcile(&self, entry: &OrchestrationEntry) -> Result<ReconcileOutcome, StoreError> {
        match self.store.find_by_id(&entry.id).await {
            Ok(_existing) => {
                // Full overwrite with the incoming desired state; the stored
                // entry is discarded except through store-side concurrency
                // checks.
                self.store.update(entry).await?;
                Ok(ReconcileOutcome::Updated)
            }
            Err(StoreError::NotFound { .. }) => {
                debug!(entry_id = %entry.id, "Entry not found, taking creation path");
                self.store.create(entry).await?;
                Ok(ReconcileOutcome::Created)
            }
            Err(e) => Err(e),
        }
    }

    async fn acknowledge(&self, handle: &dyn MessageAck) {
        if let Err(e) = handle.ack().await {
            warn!(error = %e, "Failed to ack message; it may be redelivered");
        }
    }

    async fn negative_acknowledge(&self, handle: &dyn MessageAck) {
        if let Err(e) = handle.nak().await {
            warn!(error = %e, "Failed to nak message; redelivery falls back to the visibility timeout");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::MessagingResult;
    use crate::models::OrchestrationState;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct CountingAck {
        ack_calls: AtomicUsize,
        nak_calls: AtomicUsize,
    }

    impl CountingAck {
        fn new() -> Self {
            Self {
                ack_calls: AtomicUsize::new(0),
                nak_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MessageAck for CountingAck {
        async fn ack(&self) -> MessagingResult<()> {
            self.ack_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn nak(&self) -> MessagingResult<()> {
            self.nak_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Minimal scripted store for reconcile-level tests
    struct ScriptedStore {
        find_result: Mutex<Option<Result<OrchestrationEntry, StoreError>>>,
        create_result: Mutex<Option<Result<OrchestrationEntry, StoreError>>>,
        update_result: Mutex<Option<Result<(), StoreError>>>,
    }

    #[async_trait]
    impl OrchestrationEntryStore for ScriptedStore {
        async fn find_by_id(&self, id: &str) -> Result<OrchestrationEntry, StoreError> {
            self.find_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(StoreError::not_found(id)))
        }

        async fn create(&self, entry: &OrchestrationEntry) -> Result<OrchestrationEntry, StoreError> {
            self.create_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(entry.clone()))
        }

        async fn update(&self, _entry: &OrchestrationEntry) -> Result<(), StoreError> {
            self.update_result.lock().unwrap().take().unwrap_or(Ok(()))
        }
    }

    fn entry(id: &str, state: OrchestrationState) -> OrchestrationEntry {
        OrchestrationEntry {
            id: id.to_string(),
            correlation_id: "corr-1".to_string(),
            state,
            state_timestamp: Utc::now(),
            created_timestamp: Utc::now(),
            orchestration_type: "deployment".to_string(),
        }
    }

    #[tokio::test]
    async fn test_reconcile_creates_when_not_found() {
        let store = Arc::new(ScriptedStore {
            find_result: Mutex::new(Some(Err(StoreError::not_found("orch-1")))),
            create_result: Mutex::new(None),
            update_result: Mutex::new(None),
        });
        let watcher = OrchestrationWatcher::new(store);

        let outcome = watcher
            .reconcile(&entry("orch-1", OrchestrationState::Running))
            .await
            .expect("reconcile should succeed");
        assert_eq!(outcome, ReconcileOutcome::Created);
    }

    #[tokio::test]
    async fn test_reconcile_updates_when_found() {
        let existing = entry("orch-1", OrchestrationState::Running);
        let store = Arc::new(ScriptedStore {
            find_result: Mutex::new(Some(Ok(existing))),
            create_result: Mutex::new(None),
            update_result: Mutex::new(None),
        });
        let watcher = OrchestrationWatcher::new(store);

        let outcome = watcher
            .reconcile(&entry("orch-1", OrchestrationState::Completed))
            .await
            .expect("reconcile should succeed");
        assert_eq!(outcome, ReconcileOutcome::Updated);
    }

    #[tokio::test]
    async fn test_reconcile_short_circuits_on_opaque_lookup_error() {
        let store = Arc::new(ScriptedStore {
            find_result: Mutex::new(Some(Err(StoreError::database(
                "find_by_id",
                "connection refused",
            )))),
            create_result: Mutex::new(None),
            update_result: Mutex::new(None),
        });
        let watcher = OrchestrationWatcher::new(store);

        let result = watcher
            .reconcile(&entry("orch-1", OrchestrationState::Running))
            .await;
        assert!(matches!(result, Err(StoreError::Database { .. })));
    }

    #[tokio::test]
    async fn test_ack_failure_is_swallowed() {
        struct FailingAck;

        #[async_trait]
        impl MessageAck for FailingAck {
            async fn ack(&self) -> MessagingResult<()> {
                Err(crate::messaging::MessagingError::internal("ack failed"))
            }

            async fn nak(&self) -> MessagingResult<()> {
                panic!("nak must not be called on the success path");
            }
        }

        let store = Arc::new(ScriptedStore {
            find_result: Mutex::new(Some(Err(StoreError::not_found("orch-1")))),
            create_result: Mutex::new(None),
            update_result: Mutex::new(None),
        });
        let watcher = OrchestrationWatcher::new(store);

        let payload =
            serde_json::to_vec(&entry("orch-1", OrchestrationState::Running)).unwrap();
        // Must not panic or attempt a second terminal action
        watcher.on_message(&payload, &FailingAck).await;
    }

    #[tokio::test]
    async fn test_malformed_payload_acked_without_store_access() {
        struct PanickingStore;

        #[async_trait]
        impl OrchestrationEntryStore for PanickingStore {
            async fn find_by_id(&self, _id: &str) -> Result<OrchestrationEntry, StoreError> {
                panic!("store must not be touched for a poison message");
            }

            async fn create(
                &self,
                _entry: &OrchestrationEntry,
            ) -> Result<OrchestrationEntry, StoreError> {
                panic!("store must not be touched for a poison message");
            }

            async fn update(&self, _entry: &OrchestrationEntry) -> Result<(), StoreError> {
                panic!("store must not be touched for a poison message");
            }
        }

        let watcher = OrchestrationWatcher::new(Arc::new(PanickingStore));
        let handle = CountingAck::new();

        watcher.on_message(b"not json at all", &handle).await;

        assert_eq!(handle.ack_calls.load(Ordering::SeqCst), 1);
        assert_eq!(handle.nak_calls.load(Ordering::SeqCst), 0);
    }
}
