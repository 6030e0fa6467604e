//! The evidence custody record.

use custody_core::LedgerTimestamp;
use serde::{Deserialize, Serialize};

/// Holder assigned to every new evidence record.
pub const INITIAL_OWNER: &str = "FirstResponder";

/// Owner sentinel of soft-deleted evidence.
pub const DELETED_OWNER: &str = "DELETED";

/// Custody record of one piece of evidence.
///
/// `transfer_history` and `timestamp_history` always have the same length
/// and only ever grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// Unique evidence identifier.
    #[serde(rename = "evidenceID")]
    pub evidence_id: String,
    /// Free-text description, fixed at creation.
    pub description: String,
    /// Current holder, or [`DELETED_OWNER`].
    pub owner: String,
    /// Every holder in order, earliest first.
    #[serde(rename = "transferHistory")]
    pub transfer_history: Vec<String>,
    /// When each holder took custody, aligned with `transfer_history`.
    #[serde(rename = "timestampHistory")]
    pub timestamp_history: Vec<String>,
}

/// One step of the custody chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustodyEvent<'a> {
    /// Holder label.
    pub owner: &'a str,
    /// When the holder took custody.
    pub timestamp: &'a str,
}

impl Evidence {
    /// A freshly created record held by [`INITIAL_OWNER`].
    #[must_use]
    pub fn new(
        evidence_id: impl Into<String>,
        description: impl Into<String>,
        at: LedgerTimestamp,
    ) -> Self {
        Self {
            evidence_id: evidence_id.into(),
            description: description.into(),
            owner: INITIAL_OWNER.to_owned(),
            transfer_history: vec![INITIAL_OWNER.to_owned()],
            timestamp_history: vec![at.format()],
        }
    }

    /// Hand custody to `new_owner`.
    pub fn transfer(&mut self, new_owner: impl Into<String>, at: LedgerTimestamp) {
        let new_owner = new_owner.into();
        self.transfer_history.push(new_owner.clone());
        self.timestamp_history.push(at.format());
        self.owner = new_owner;
    }

    /// Soft-delete: flag the owner, keep the history.
    pub fn mark_deleted(&mut self) {
        DELETED_OWNER.clone_into(&mut self.owner);
    }

    /// Whether the record carries the deletion sentinel.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.owner == DELETED_OWNER
    }

    /// Holders paired with their custody timestamps, earliest first.
    pub fn custody_chain(&self) -> impl Iterator<Item = CustodyEvent<'_>> {
        self.transfer_history
            .iter()
            .zip(&self.timestamp_history)
            .map(|(owner, timestamp)| CustodyEvent { owner, timestamp })
    }
}
