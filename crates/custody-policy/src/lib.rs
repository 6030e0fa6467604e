//! Custody Policy - Organization-based authorization for ledger actions.
//!
//! Every contract operation names a [`PolicyAction`]. The [`PolicyEngine`]
//! looks the action up in a [`PolicyTable`] and admits the caller only if
//! its organization is on that action's [`AllowList`].
//!
//! The engine is pure: no storage access, no identity resolution. The
//! caller's organization is resolved by the contract and passed in.
//!
//! # Example
//!
//! ```
//! use custody_core::OrgId;
//! use custody_policy::{PolicyAction, PolicyEngine, PolicyTable};
//!
//! let engine = PolicyEngine::new(PolicyTable::default());
//! assert!(engine.authorize(PolicyAction::CreateEvidence, &OrgId::from("Org1MSP")).is_ok());
//! assert!(engine.authorize(PolicyAction::CreateEvidence, &OrgId::from("Org2MSP")).is_err());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod engine;
pub mod error;
pub mod table;

pub use engine::PolicyEngine;
pub use error::{PolicyError, PolicyResult};
pub use table::{AllowList, ORG1_MSP, ORG2_MSP, PolicyAction, PolicyTable};
