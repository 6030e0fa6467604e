//! Transaction log entries.

use std::fmt;

use custody_core::TxId;
use serde::{Deserialize, Serialize};

/// Prefix of every log identifier; the rest is the transaction id.
pub const LOG_ID_PREFIX: &str = "LOG-";

/// Label prefix used when the caller is not a registered participant.
pub const UNREGISTERED_PREFIX: &str = "Unregistered";

/// The mutating action an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    /// Evidence was created.
    Create,
    /// Evidence changed hands.
    Transfer,
    /// Evidence was soft-deleted.
    Delete,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "Create",
            Self::Transfer => "Transfer",
            Self::Delete => "Delete",
        })
    }
}

/// One immutable audit entry.
///
/// Field order is the JSON field order of the rendered listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLog {
    /// `LOG-` followed by the transaction id.
    #[serde(rename = "logID")]
    pub log_id: String,
    /// What happened.
    pub action: AuditAction,
    /// The evidence acted upon.
    #[serde(rename = "evidenceID")]
    pub evidence_id: String,
    /// When, as `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    /// Role of the caller, or `Unregistered(<org>)`.
    #[serde(rename = "performedBy")]
    pub performed_by: String,
}

impl TransactionLog {
    /// Log identifier for the entry written by transaction `tx`.
    #[must_use]
    pub fn log_id_for(tx: &TxId) -> String {
        format!("{LOG_ID_PREFIX}{tx}")
    }

    /// Attribution label for a caller that is not in the directory.
    #[must_use]
    pub fn unregistered(org: &str) -> String {
        format!("{UNREGISTERED_PREFIX}({org})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_id() {
        assert_eq!(TransactionLog::log_id_for(&TxId::new("abc123")), "LOG-abc123");
    }

    #[test]
    fn test_unregistered_label() {
        assert_eq!(TransactionLog::unregistered("Org3MSP"), "Unregistered(Org3MSP)");
    }

    #[test]
    fn test_json_shape() {
        let entry = TransactionLog {
            log_id: "LOG-1".into(),
            action: AuditAction::Transfer,
            evidence_id: "EV1".into(),
            timestamp: "2024-01-01 00:00:00".into(),
            performed_by: "Lab".into(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"logID":"LOG-1","action":"Transfer","evidenceID":"EV1","timestamp":"2024-01-01 00:00:00","performedBy":"Lab"}"#
        );
    }
}
