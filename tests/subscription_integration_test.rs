//! # Subscription Integration Tests
//!
//! End-to-end path through pgmq: publish an event, poll one batch through the
//! watcher, and verify store convergence and queue consumption. Skipped
//! unless `TEST_DATABASE_URL` points at a database with the pgmq extension.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use pmanager_core::config::WatcherConfig;
use pmanager_core::messaging::PgmqClient;
use pmanager_core::models::{OrchestrationEntry, OrchestrationState};
use pmanager_core::orchestration::{OrchestrationWatcher, WatcherSubscription};
use pmanager_core::store::{OrchestrationEntryStore, PgOrchestrationStore};

#[tokio::test]
async fn test_published_event_converges_into_store() {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        println!("Skipping subscription integration test - no TEST_DATABASE_URL provided");
        return;
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to create connection pool");

    let store = Arc::new(PgOrchestrationStore::new(pool.clone()));
    store.ensure_schema().await.expect("Failed to ensure schema");

    let client = Arc::new(PgmqClient::new_with_pool(pool).await);

    // Unique queue per run so concurrent test sessions do not interfere
    let queue_name = format!("watcher_e2e_{}", Uuid::new_v4().simple());
    let config = WatcherConfig {
        queue_name: queue_name.clone(),
        ..WatcherConfig::default()
    };

    let watcher = Arc::new(OrchestrationWatcher::new(store.clone()));
    let subscription = WatcherSubscription::new(client.clone(), watcher, config);
    subscription
        .initialize_queue()
        .await
        .expect("Failed to create queue");

    let entry = OrchestrationEntry {
        id: format!("orch-{}", Uuid::new_v4()),
        correlation_id: "corr-e2e".to_string(),
        state: OrchestrationState::Running,
        state_timestamp: Utc::now(),
        created_timestamp: Utc::now(),
        orchestration_type: "e2e-test".to_string(),
    };

    client
        .send_json_message(&queue_name, &entry)
        .await
        .expect("Failed to publish event");

    let processed = subscription.poll_once().await.expect("Poll should succeed");
    assert_eq!(processed, 1, "Exactly one message should be dispatched");

    let stored = store
        .find_by_id(&entry.id)
        .await
        .expect("Entry should have been created");
    assert_eq!(stored.state, OrchestrationState::Running);

    // The successful reconciliation acked (deleted) the message
    let remaining = client
        .read_messages(&queue_name, Some(1), Some(10))
        .await
        .expect("Read should succeed");
    assert!(remaining.is_empty(), "Queue should be drained after ack");

    client.drop_queue(&queue_name).await.expect("Failed to drop queue");
}
