//! Custody Contract - Chain-of-custody for evidence.
//!
//! [`CustodyContract`] is the surface callers invoke. Each operation:
//!
//! 1. resolves the caller's organization and runs it through the
//!    [`PolicyEngine`](custody_policy::PolicyEngine) before touching state
//! 2. reads and mutates the [`Evidence`] record
//! 3. stages the record and its audit entry into one
//!    [`WriteBatch`](custody_storage::WriteBatch) and commits it
//!
//! Evidence moves through `Absent -> Active -> (Transferred)* -> Deleted`.
//! Deletion is soft: the owner becomes [`DELETED_OWNER`] and the history is
//! kept.
//!
//! [`WorldStateContract`] is a plain key/value contract over the same store.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod contract;
pub mod error;
pub mod evidence;
pub mod options;
pub mod world_state;

pub use contract::CustodyContract;
pub use error::{ContractError, ContractResult};
pub use evidence::{CustodyEvent, DELETED_OWNER, Evidence, INITIAL_OWNER};
pub use options::CustodyOptions;
pub use world_state::WorldStateContract;

pub use custody_audit::{AuditAction, TransactionLog};
pub use custody_directory::Participant;
