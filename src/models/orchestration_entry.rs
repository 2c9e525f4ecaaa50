//! # Orchestration Entry Model
//!
//! The reconciled unit of state. An entry is the desired state conveyed by a
//! lifecycle event, not a delta: the watcher overwrites, it does not merge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OrchestrationEntry represents the persisted state of one orchestration
/// workflow, keyed by `id`. Maps to the `orchestration_entries` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationEntry {
    /// Stable identity, unique key in the store
    pub id: String,
    /// Links the entry to its originating workflow/request; not used for identity
    pub correlation_id: String,
    /// Current orchestration state as observed by the publisher
    pub state: OrchestrationState,
    /// When the state was last observed/set
    pub state_timestamp: DateTime<Utc>,
    /// When the entry first existed
    pub created_timestamp: DateTime<Utc>,
    /// Classifies the workflow kind (e.g. "deployment", "teardown")
    pub orchestration_type: String,
}

/// Orchestration lifecycle states.
///
/// The set is open: the watcher persists whatever state an event carries and
/// never validates transition legality, so unknown values are preserved
/// verbatim rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrchestrationState {
    Uninitialized,
    Running,
    Completed,
    Errored,
    Cancelled,
    Other(String),
}

impl OrchestrationState {
    pub fn as_str(&self) -> &str {
        match self {
            OrchestrationState::Uninitialized => "UNINITIALIZED",
            OrchestrationState::Running => "RUNNING",
            OrchestrationState::Completed => "COMPLETED",
            OrchestrationState::Errored => "ERRORED",
            OrchestrationState::Cancelled => "CANCELLED",
            OrchestrationState::Other(value) => value,
        }
    }
}

impl From<String> for OrchestrationState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "UNINITIALIZED" => OrchestrationState::Uninitialized,
            "RUNNING" => OrchestrationState::Running,
            "COMPLETED" => OrchestrationState::Completed,
            "ERRORED" => OrchestrationState::Errored,
            "CANCELLED" => OrchestrationState::Cancelled,
            _ => OrchestrationState::Other(value),
        }
    }
}

impl From<OrchestrationState> for String {
    fn from(state: OrchestrationState) -> Self {
        state.as_str().to_string()
    }
}

impl std::fmt::Display for OrchestrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
