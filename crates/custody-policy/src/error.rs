//! Policy error types.

use thiserror::Error;

/// Errors raised by the policy engine.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The caller's organization is not on the action's allow-list.
    #[error("organization {org} is not authorized to perform {action}")]
    Unauthorized {
        /// The rejected organization.
        org: String,
        /// The attempted action.
        action: String,
    },

    /// A policy rule is malformed.
    #[error("invalid policy for {action}: {reason}")]
    InvalidRule {
        /// The action the rule applies to.
        action: String,
        /// Why the rule is invalid.
        reason: String,
    },
}

/// Result type for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;
