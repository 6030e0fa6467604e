//! Audit error types.

use custody_core::IdentityError;
use custody_storage::StorageError;
use thiserror::Error;

/// Errors that can occur with the audit log.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The invocation's identity could not be resolved.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The transaction already wrote an audit entry.
    #[error("transaction log already exists: {log_id}")]
    DuplicateLogId {
        /// The taken log id.
        log_id: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
