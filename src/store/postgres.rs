//! # PostgreSQL Entity Store
//!
//! sqlx-backed implementation of [`OrchestrationEntryStore`] over the
//! `orchestration_entries` table. Queries use the runtime API so the crate
//! builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;

use super::{OrchestrationEntryStore, StoreError, StoreResult};
use crate::models::{OrchestrationEntry, OrchestrationState};

/// Row shape for the `orchestration_entries` table. The state column is TEXT
/// so unknown state values persist verbatim.
#[derive(Debug, Clone, FromRow)]
struct OrchestrationEntryRow {
    id: String,
    correlation_id: String,
    state: String,
    state_timestamp: DateTime<Utc>,
    created_timestamp: DateTime<Utc>,
    orchestration_type: String,
}

impl From<OrchestrationEntryRow> for OrchestrationEntry {
    fn from(row: OrchestrationEntryRow) -> Self {
        OrchestrationEntry {
            id: row.id,
            correlation_id: row.correlation_id,
            state: OrchestrationState::from(row.state),
            state_timestamp: row.state_timestamp,
            created_timestamp: row.created_timestamp,
            orchestration_type: row.orchestration_type,
        }
    }
}

/// PostgreSQL-backed orchestration entry store
#[derive(Debug, Clone)]
pub struct PgOrchestrationStore {
    pool: PgPool,
}

impl PgOrchestrationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotent DDL so integration environments can stand the store up
    /// without a separate migration step.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS orchestration_entries (
                id TEXT PRIMARY KEY,
                correlation_id TEXT NOT NULL,
                state TEXT NOT NULL,
                state_timestamp TIMESTAMPTZ NOT NULL,
                created_timestamp TIMESTAMPTZ NOT NULL,
                orchestration_type TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database("ensure_schema", e.to_string()))?;

        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl OrchestrationEntryStore for PgOrchestrationStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<OrchestrationEntry> {
        let row = sqlx::query_as::<_, OrchestrationEntryRow>(
            r"
            SELECT id, correlation_id, state, state_timestamp, created_timestamp, orchestration_type
            FROM orchestration_entries
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::database("find_by_id", e.to_string()))?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(StoreError::not_found(id)),
        }
    }

    async fn create(&self, entry: &OrchestrationEntry) -> StoreResult<OrchestrationEntry> {
        let row = sqlx::query_as::<_, OrchestrationEntryRow>(
            r"
            INSERT INTO orchestration_entries
                (id, correlation_id, state, state_timestamp, created_timestamp, orchestration_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, correlation_id, state, state_timestamp, created_timestamp, orchestration_type
            ",
        )
        .bind(&entry.id)
        .bind(&entry.correlation_id)
        .bind(entry.state.as_str())
        .bind(entry.state_timestamp)
        .bind(entry.created_timestamp)
        .bind(&entry.orchestration_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::database("create", e.to_string()))?;

        debug!(entry_id = %entry.id, "Created orchestration entry");
        Ok(row.into())
    }

    async fn update(&self, entry: &OrchestrationEntry) -> StoreResult<()> {
        // Full overwrite of mutable fields; identity fields unchanged
        let result = sqlx::query(
            r"
            UPDATE orchestration_entries
            SET correlation_id = $2,
                state = $3,
                state_timestamp = $4,
                orchestration_type = $5
            WHERE id = $1
            ",
        )
        .bind(&entry.id)
        .bind(&entry.correlation_id)
        .bind(entry.state.as_str())
        .bind(entry.state_timestamp)
        .bind(&entry.orchestration_type)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database("update", e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(&entry.id));
        }

        debug!(entry_id = %entry.id, state = %entry.state, "Updated orchestration entry");
        Ok(())
    }
}
