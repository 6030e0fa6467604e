//! Common types used throughout the custody ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall-clock format used for every persisted timestamp.
///
/// Lexicographic order of strings in this format matches chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Organization identifier of a caller (the unit of authorization).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgId(pub String);

impl OrgId {
    /// Create an organization id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrgId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the transaction enclosing an invocation.
///
/// Unique per invocation; audit entry identifiers are derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(pub String);

impl TxId {
    /// Create a transaction id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key-space partition of the shared store.
///
/// Every record kind lives in its own namespace, so a scan over one kind
/// never sees another kind's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Participant directory records.
    Participant,
    /// Evidence custody records.
    Evidence,
    /// Audit (transaction log) entries.
    Audit,
    /// Free-form key/value pairs of the world-state contract.
    WorldState,
}

impl Namespace {
    /// Storage namespace string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Participant => "custody:participants",
            Self::Evidence => "custody:evidence",
            Self::Audit => "custody:audit",
            Self::WorldState => "custody:world_state",
        }
    }

    /// Human-readable record kind, used in error messages.
    #[must_use]
    pub fn record_kind(self) -> &'static str {
        match self {
            Self::Participant => "participant",
            Self::Evidence => "evidence",
            Self::Audit => "transaction log",
            Self::WorldState => "world state entry",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.record_kind())
    }
}

/// What a create-style operation does when its key is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingRecordPolicy {
    /// Fail with an already-exists error and write nothing.
    #[default]
    Reject,
    /// Overwrite the stored record.
    Replace,
}

/// Timestamp of a ledger event, persisted at second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LedgerTimestamp(pub DateTime<Utc>);

impl LedgerTimestamp {
    /// Get the current timestamp.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Render in the persisted [`TIMESTAMP_FORMAT`].
    #[must_use]
    pub fn format(&self) -> String {
        self.0.format(TIMESTAMP_FORMAT).to_string()
    }
}

impl fmt::Display for LedgerTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_format_second_resolution() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let ts = LedgerTimestamp::from_datetime(dt);
        assert_eq!(ts.format(), "2024-03-09 07:05:01");
        assert_eq!(ts.to_string(), ts.format());
    }

    #[test]
    fn test_timestamp_strings_sort_chronologically() {
        let earlier =
            LedgerTimestamp::from_datetime(Utc.with_ymd_and_hms(2024, 9, 30, 23, 59, 59).unwrap());
        let later =
            LedgerTimestamp::from_datetime(Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap());
        assert!(earlier.format() < later.format());
    }

    #[test]
    fn test_namespaces_are_distinct() {
        let all = [
            Namespace::Participant,
            Namespace::Evidence,
            Namespace::Audit,
            Namespace::WorldState,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in all.iter().skip(i.saturating_add(1)) {
                assert_ne!(a.as_str(), b.as_str());
            }
        }
    }

    #[test]
    fn test_existing_record_policy_default_rejects() {
        assert_eq!(ExistingRecordPolicy::default(), ExistingRecordPolicy::Reject);
    }

    #[test]
    fn test_org_id_display() {
        let org = OrgId::from("Org1MSP");
        assert_eq!(org.to_string(), "Org1MSP");
        assert_eq!(org.as_str(), "Org1MSP");
    }
}
