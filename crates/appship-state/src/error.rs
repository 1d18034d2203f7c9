//! Error types for appship-state

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in the app version store
#[derive(Error, Debug)]
pub enum StateError {
    /// No record with this id
    #[error("app version not found: {0}")]
    NotFound(Uuid),

    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded or decoded
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StateError>;
