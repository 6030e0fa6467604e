//! Custody Storage - The world state behind every contract operation.
//!
//! The ledger keeps participants, evidence records and audit entries in one
//! flat key-value store. This crate provides:
//!
//! - The [`KvStore`] trait: byte-level `get`/`set`/`exists`, an ordered
//!   per-namespace `scan`, and an atomic multi-key `commit`
//! - [`MemoryKvStore`], always available, for tests and ephemeral ledgers
//! - [`SurrealKvStore`] (behind the **`kv`** feature), an embedded,
//!   ACID-compliant LSM-tree store for persistent ledgers
//! - [`ScopedKvStore`], a view pre-bound to one [`Namespace`] with typed
//!   JSON helpers
//! - [`WriteBatch`], the unit of atomic commit used to couple a record
//!   mutation with its audit entry
//!
//! Namespaces are typed ([`custody_core::Namespace`]), so records of
//! different kinds can never collide or leak into each other's scans.
//!
//! # Feature Flags
//!
//! - **`kv`** - `SurrealKV` persistent key-value store
//!
//! [`Namespace`]: custody_core::Namespace

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod batch;
pub mod error;
pub mod kv;

pub use batch::{KvWrite, WriteBatch};
pub use error::{StorageError, StorageResult};
pub use kv::{KvEntry, KvStore, MemoryKvStore, ScopedKvStore};

#[cfg(feature = "kv")]
pub use kv::SurrealKvStore;
