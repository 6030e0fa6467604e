//! Custody Telemetry - Logging for the custody ledger.
//!
//! Contract operations emit structured `tracing` events inside one span per
//! operation. This crate installs the subscriber that renders them.
//!
//! # Example
//!
//! ```rust,no_run
//! use custody_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), custody_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Json)
//!     .with_directive("custody_audit=debug");
//!
//! setup_logging(&config)?;
//! tracing::info!("ledger ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
