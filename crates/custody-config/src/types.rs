//! Configuration types for the custody ledger.
//!
//! These types have no dependencies on other custody crates. The CLI
//! converts them into policy tables and contract options at startup.
//! Every section implements [`Default`] with the values of the embedded
//! `defaults.toml`, so a bare `[section]` header is a working config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Allow-list entry that admits every organization.
pub const ANY_ORG: &str = "*";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which organizations may perform which action.
    pub policy: PolicySection,
    /// Custody state-machine switches.
    pub custody: CustodySection,
    /// Where the ledger lives on disk.
    pub storage: StorageSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// PolicySection
// ---------------------------------------------------------------------------

/// Per-action organization allow-lists.
///
/// `None` (key absent) or `["*"]` leaves the action unrestricted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySection {
    /// `RegisterParticipant`.
    pub register_participant: Option<Vec<String>>,
    /// `GetParticipant`.
    pub get_participant: Option<Vec<String>>,
    /// `CreateEvidence`.
    pub create_evidence: Option<Vec<String>>,
    /// `TransferEvidence`.
    pub transfer_evidence: Option<Vec<String>>,
    /// `DeleteEvidence`.
    pub delete_evidence: Option<Vec<String>>,
    /// `GetEvidenceDetails`.
    pub read_evidence: Option<Vec<String>>,
    /// `GetTransactionLogs`.
    pub list_transaction_logs: Option<Vec<String>>,
}

impl PolicySection {
    /// Every rule with its config key, in a fixed order.
    #[must_use]
    pub fn rules(&self) -> [(&'static str, Option<&[String]>); 7] {
        [
            ("register_participant", self.register_participant.as_deref()),
            ("get_participant", self.get_participant.as_deref()),
            ("create_evidence", self.create_evidence.as_deref()),
            ("transfer_evidence", self.transfer_evidence.as_deref()),
            ("delete_evidence", self.delete_evidence.as_deref()),
            ("read_evidence", self.read_evidence.as_deref()),
            ("list_transaction_logs", self.list_transaction_logs.as_deref()),
        ]
    }

    /// Whether a configured list admits every organization.
    #[must_use]
    pub fn is_wildcard(orgs: &[String]) -> bool {
        orgs.iter().any(|o| o == ANY_ORG)
    }
}

impl Default for PolicySection {
    fn default() -> Self {
        let both = || Some(vec!["Org1MSP".to_owned(), "Org2MSP".to_owned()]);
        Self {
            register_participant: None,
            get_participant: None,
            create_evidence: Some(vec!["Org1MSP".to_owned()]),
            transfer_evidence: both(),
            delete_evidence: both(),
            read_evidence: None,
            list_transaction_logs: None,
        }
    }
}

// ---------------------------------------------------------------------------
// CustodySection
// ---------------------------------------------------------------------------

/// What a create-style operation does with an id that is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnExisting {
    /// Fail and write nothing.
    #[default]
    Reject,
    /// Overwrite.
    Replace,
}

/// Custody state-machine switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustodySection {
    /// `CreateEvidence` on an existing id.
    pub on_existing_evidence: OnExisting,
    /// `RegisterParticipant` on an existing id.
    pub on_existing_participant: OnExisting,
    /// Refuse transfers and deletes of deleted evidence.
    pub deleted_is_terminal: bool,
}

impl Default for CustodySection {
    fn default() -> Self {
        Self {
            on_existing_evidence: OnExisting::Reject,
            on_existing_participant: OnExisting::Replace,
            deleted_is_terminal: false,
        }
    }
}

// ---------------------------------------------------------------------------
// StorageSection
// ---------------------------------------------------------------------------

/// Ledger storage location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Directory of the persistent store. `None` uses `~/.custody/data`.
    pub data_dir: Option<String>,
}

impl StorageSection {
    /// The effective data directory, given the custody home directory.
    #[must_use]
    pub fn resolve_data_dir(&self, custody_home: &Path) -> PathBuf {
        self.data_dir
            .as_ref()
            .map_or_else(|| custody_home.join("data"), PathBuf::from)
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["custody_audit=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
