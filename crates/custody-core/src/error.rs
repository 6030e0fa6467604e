//! Identity resolution error types.

use thiserror::Error;

/// Errors raised by the identity layer while resolving the invocation context.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The caller's organization could not be determined.
    #[error("failed to retrieve organization id: {0}")]
    OrgUnavailable(String),

    /// The caller identifier could not be determined.
    #[error("failed to retrieve caller id: {0}")]
    CallerUnavailable(String),

    /// The enclosing transaction has no identifier.
    #[error("failed to retrieve transaction id: {0}")]
    TransactionUnavailable(String),
}

/// Result type for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;
