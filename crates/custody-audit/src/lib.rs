//! Custody Audit - The ledger's transaction log.
//!
//! Every successful create, transfer and delete leaves exactly one
//! [`TransactionLog`] entry behind. Entries are written once and never
//! updated. This crate provides:
//!
//! - [`TransactionLog`] and [`AuditAction`], the persisted entry
//! - [`resolve_caller`], best-effort decoding of the caller id issued by
//!   the identity layer
//! - [`AuditLog`], which attributes entries to a participant role, stages
//!   them into the caller's [`WriteBatch`](custody_storage::WriteBatch), and
//!   renders the numbered, chronologically ordered listing
//!
//! # Example
//!
//! ```rust,ignore
//! let mut batch = WriteBatch::new();
//! batch.put_json(Namespace::Evidence, "EV1", &record)?;
//! audit.stage(&mut batch, &ctx, AuditAction::Create, "EV1", ctx.timestamp()).await?;
//! store.commit(batch).await?;
//!
//! print!("{}", audit.transaction_logs().await?);
//! // 1 - {"logID":"LOG-tx1","action":"Create",...}
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod caller;
pub mod entry;
pub mod error;
pub mod log;

pub use caller::{CallerResolution, resolve_caller};
pub use entry::{AuditAction, LOG_ID_PREFIX, TransactionLog, UNREGISTERED_PREFIX};
pub use error::{AuditError, AuditResult};
pub use log::{AuditLog, render_listing};
