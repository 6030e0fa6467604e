//! Custody Core - Foundation types for the chain-of-custody ledger.
//!
//! This crate provides:
//! - Identifier newtypes for organizations and transactions
//! - The [`Namespace`] enum that partitions the shared key space
//! - Second-resolution ledger timestamps
//! - The [`InvocationContext`] trait through which the identity layer
//!   hands the caller's organization, caller id and transaction id to
//!   every contract operation

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod context;
pub mod error;
pub mod types;

pub use context::InvocationContext;
pub use error::{IdentityError, IdentityResult};
pub use types::{
    ExistingRecordPolicy, LedgerTimestamp, Namespace, OrgId, TIMESTAMP_FORMAT, TxId,
};
