use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum PmanagerError {
    DatabaseError(String),
    MessagingError(String),
    OrchestrationError(String),
    ValidationError(String),
    ConfigurationError(String),
}

impl fmt::Display for PmanagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PmanagerError::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            PmanagerError::MessagingError(msg) => write!(f, "Messaging error: {msg}"),
            PmanagerError::OrchestrationError(msg) => write!(f, "Orchestration error: {msg}"),
            PmanagerError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            PmanagerError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for PmanagerError {}

pub type Result<T> = std::result::Result<T, PmanagerError>;
