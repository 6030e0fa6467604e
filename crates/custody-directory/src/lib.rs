//! Custody Directory - Who is who on the ledger.
//!
//! Maps a participant identifier to a role label and the organization that
//! registered it. The audit log consults the directory to attribute each
//! entry to a role.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod directory;
pub mod error;
pub mod participant;

pub use directory::ParticipantDirectory;
pub use error::{DirectoryError, DirectoryResult};
pub use participant::Participant;
