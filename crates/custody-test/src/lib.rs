//! Custody Test - Shared test utilities for the custody ledger.
//!
//! This crate provides an invocation-context fixture and a fault-injecting
//! store that can be used across the custody crates as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! custody-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use custody_test::{TestInvocation, ORG1};
//!
//! let ctx = TestInvocation::new(ORG1, "alice");
//! contract.create_evidence(&ctx, "EV1", "Knife").await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;

/// Install a test-friendly `tracing` subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `warn`. Output goes through the test
/// writer so it is captured per test.
pub fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
