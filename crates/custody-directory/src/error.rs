//! Directory error types.

use custody_core::IdentityError;
use custody_storage::StorageError;
use thiserror::Error;

/// Errors from participant directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// No participant is stored under the id.
    #[error("participant not found: {participant_id}")]
    NotFound {
        /// The requested participant id.
        participant_id: String,
    },

    /// A record exists but cannot be decoded.
    #[error("participant record {participant_id} is corrupt: {reason}")]
    Corrupt {
        /// The participant id.
        participant_id: String,
        /// Decoder message.
        reason: String,
    },

    /// Registration refused because the id is taken.
    #[error("participant already exists: {participant_id}")]
    AlreadyExists {
        /// The participant id.
        participant_id: String,
    },

    /// The registrar's identity could not be resolved.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
