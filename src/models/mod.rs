pub mod orchestration_entry;

// Re-export core models for easy access
pub use orchestration_entry::{OrchestrationEntry, OrchestrationState};
