//! Storage error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors a storage backend can report while persisting the current state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorageError {
    /// The backend refused or failed the write
    #[error("Failed to write state: {reason}")]
    WriteFailed { reason: String },

    /// The instance has no stored document to update
    #[error("Document {id} not found")]
    DocumentNotFound { id: Uuid },

    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Stored document version is not supported by this version
    #[error("Unsupported document version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// A persisted state name is not declared by the machine
    #[error("State '{state}' is not declared by this machine")]
    UndeclaredState { state: String },
}
