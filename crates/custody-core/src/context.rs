//! Invocation context supplied by the identity layer.
//!
//! Authentication happens outside this workspace. By the time a contract
//! operation runs, the identity layer has established who is calling and
//! exposes it through [`InvocationContext`].

use crate::error::IdentityResult;
use crate::types::{LedgerTimestamp, OrgId, TxId};

/// Ambient identity of one contract invocation.
pub trait InvocationContext: Send + Sync {
    /// Organization the caller belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity layer cannot resolve the organization.
    fn org_id(&self) -> IdentityResult<OrgId>;

    /// Caller identifier as issued by the identity layer.
    ///
    /// This may be base64-encoded; consumers decode it best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity layer cannot resolve the caller.
    fn caller_id(&self) -> IdentityResult<String>;

    /// Identifier of the enclosing transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the invocation is not part of a transaction.
    fn transaction_id(&self) -> IdentityResult<TxId>;

    /// Wall-clock time of the invocation.
    fn timestamp(&self) -> LedgerTimestamp {
        LedgerTimestamp::now()
    }
}
