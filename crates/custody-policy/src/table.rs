//! Actions, allow-lists and the policy table.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use custody_core::OrgId;
use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyResult};

/// Organization permitted to create evidence under the default table.
pub const ORG1_MSP: &str = "Org1MSP";
/// Second organization of the default two-org deployment.
pub const ORG2_MSP: &str = "Org2MSP";

/// An operation subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyAction {
    /// Register (or re-register) a participant.
    RegisterParticipant,
    /// Look up a participant.
    GetParticipant,
    /// Create an evidence record.
    CreateEvidence,
    /// Hand evidence to a new owner.
    TransferEvidence,
    /// Soft-delete an evidence record.
    DeleteEvidence,
    /// Read an evidence record.
    ReadEvidence,
    /// Enumerate the audit log.
    ListTransactionLogs,
}

impl PolicyAction {
    /// Every action, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::RegisterParticipant,
        Self::GetParticipant,
        Self::CreateEvidence,
        Self::TransferEvidence,
        Self::DeleteEvidence,
        Self::ReadEvidence,
        Self::ListTransactionLogs,
    ];

    /// Contract operation name of this action.
    #[must_use]
    pub fn operation_name(self) -> &'static str {
        match self {
            Self::RegisterParticipant => "RegisterParticipant",
            Self::GetParticipant => "GetParticipant",
            Self::CreateEvidence => "CreateEvidence",
            Self::TransferEvidence => "TransferEvidence",
            Self::DeleteEvidence => "DeleteEvidence",
            Self::ReadEvidence => "GetEvidenceDetails",
            Self::ListTransactionLogs => "GetTransactionLogs",
        }
    }

    /// Key naming this action in configuration files.
    ///
    /// Matches the action's serialized form.
    #[must_use]
    pub fn config_key(self) -> &'static str {
        match self {
            Self::RegisterParticipant => "register_participant",
            Self::GetParticipant => "get_participant",
            Self::CreateEvidence => "create_evidence",
            Self::TransferEvidence => "transfer_evidence",
            Self::DeleteEvidence => "delete_evidence",
            Self::ReadEvidence => "read_evidence",
            Self::ListTransactionLogs => "list_transaction_logs",
        }
    }

    /// The action a configuration key names, if any.
    #[must_use]
    pub fn from_config_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.config_key() == key)
    }

    /// Whether the action mutates ledger state.
    #[must_use]
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Self::RegisterParticipant
                | Self::CreateEvidence
                | Self::TransferEvidence
                | Self::DeleteEvidence
        )
    }
}

impl fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation_name())
    }
}

/// Organizations permitted to invoke one action.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AllowList {
    /// Any organization.
    #[default]
    Any,
    /// Only the listed organizations.
    Only(BTreeSet<OrgId>),
}

impl AllowList {
    /// Build a restricted list from organization ids.
    pub fn only<I, S>(orgs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(orgs.into_iter().map(OrgId::new).collect())
    }

    /// Whether `org` is admitted.
    #[must_use]
    pub fn permits(&self, org: &OrgId) -> bool {
        match self {
            Self::Any => true,
            Self::Only(orgs) => orgs.contains(org),
        }
    }

    /// Whether the list admits every organization.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Any)
    }
}

/// Mapping from action to allow-list.
///
/// Actions without an explicit rule are unrestricted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    rules: BTreeMap<PolicyAction, AllowList>,
}

impl PolicyTable {
    /// A table where every action is unrestricted.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Set the allow-list for `action`, replacing any previous rule.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidRule`] if the list is restricted but
    /// names no organization, or names an empty organization id.
    pub fn with_rule(mut self, action: PolicyAction, allow: AllowList) -> PolicyResult<Self> {
        if let AllowList::Only(orgs) = &allow {
            if orgs.is_empty() {
                return Err(PolicyError::InvalidRule {
                    action: action.to_string(),
                    reason: "restricted allow-list names no organization".into(),
                });
            }
            if orgs.iter().any(|o| o.as_str().trim().is_empty()) {
                return Err(PolicyError::InvalidRule {
                    action: action.to_string(),
                    reason: "organization id must not be empty".into(),
                });
            }
        }
        self.rules.insert(action, allow);
        Ok(self)
    }

    /// Allow-list governing `action`.
    #[must_use]
    pub fn allow_list(&self, action: PolicyAction) -> &AllowList {
        static ANY: AllowList = AllowList::Any;
        self.rules.get(&action).unwrap_or(&ANY)
    }

    /// Restricted rules, in action order.
    pub fn restricted(&self) -> impl Iterator<Item = (PolicyAction, &AllowList)> {
        self.rules
            .iter()
            .filter(|(_, allow)| !allow.is_unrestricted())
            .map(|(action, allow)| (*action, allow))
    }
}

impl Default for PolicyTable {
    /// Two-organization deployment: only `Org1MSP` creates evidence,
    /// both organizations transfer and delete, everything else is open.
    fn default() -> Self {
        let mut rules = BTreeMap::new();
        rules.insert(PolicyAction::CreateEvidence, AllowList::only([ORG1_MSP]));
        rules.insert(
            PolicyAction::TransferEvidence,
            AllowList::only([ORG1_MSP, ORG2_MSP]),
        );
        rules.insert(
            PolicyAction::DeleteEvidence,
            AllowList::only([ORG1_MSP, ORG2_MSP]),
        );
        Self { rules }
    }
}
