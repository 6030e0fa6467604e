//! Contract error types.

use custody_audit::AuditError;
use custody_core::{IdentityError, Namespace};
use custody_directory::DirectoryError;
use custody_policy::PolicyError;
use custody_storage::StorageError;
use thiserror::Error;

/// Errors returned by contract operations.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The caller's organization may not perform the action.
    #[error("organization {org} is not authorized to perform {action}")]
    Unauthorized {
        /// The rejected organization.
        org: String,
        /// The attempted operation.
        action: String,
    },

    /// No record is stored under the id.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Record kind.
        kind: &'static str,
        /// The requested id.
        id: String,
    },

    /// A record is stored but cannot be decoded.
    #[error("{kind} {id} is corrupt: {reason}")]
    Corrupt {
        /// Record kind.
        kind: &'static str,
        /// The record id.
        id: String,
        /// Decoder message.
        reason: String,
    },

    /// A create-style operation found the id taken.
    #[error("{kind} already exists: {id}")]
    AlreadyExists {
        /// Record kind.
        kind: &'static str,
        /// The record id.
        id: String,
    },

    /// The evidence is deleted and deletion is terminal.
    #[error("evidence {evidence_id} has been deleted")]
    EvidenceDeleted {
        /// The evidence id.
        evidence_id: String,
    },

    /// The policy table is malformed.
    #[error("policy error: {0}")]
    Policy(PolicyError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StorageError),

    /// The invocation's identity could not be resolved.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl ContractError {
    /// A [`ContractError::NotFound`] for a record in `namespace`.
    pub(crate) fn not_found(namespace: Namespace, id: &str) -> Self {
        Self::NotFound {
            kind: namespace.record_kind(),
            id: id.to_owned(),
        }
    }

    /// A [`ContractError::AlreadyExists`] for a record in `namespace`.
    pub(crate) fn already_exists(namespace: Namespace, id: &str) -> Self {
        Self::AlreadyExists {
            kind: namespace.record_kind(),
            id: id.to_owned(),
        }
    }

    /// A [`ContractError::Corrupt`] for a record in `namespace`.
    pub(crate) fn corrupt(namespace: Namespace, id: &str, reason: impl ToString) -> Self {
        Self::Corrupt {
            kind: namespace.record_kind(),
            id: id.to_owned(),
            reason: reason.to_string(),
        }
    }
}

impl From<PolicyError> for ContractError {
    fn from(e: PolicyError) -> Self {
        match e {
            PolicyError::Unauthorized { org, action } => Self::Unauthorized { org, action },
            other @ PolicyError::InvalidRule { .. } => Self::Policy(other),
        }
    }
}

impl From<DirectoryError> for ContractError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::NotFound { participant_id } => {
                Self::not_found(Namespace::Participant, &participant_id)
            },
            DirectoryError::Corrupt {
                participant_id,
                reason,
            } => Self::corrupt(Namespace::Participant, &participant_id, reason),
            DirectoryError::AlreadyExists { participant_id } => {
                Self::already_exists(Namespace::Participant, &participant_id)
            },
            DirectoryError::Identity(e) => Self::Identity(e),
            DirectoryError::Storage(e) => Self::Store(e),
            DirectoryError::Serialization(msg) => Self::Serialization(msg),
        }
    }
}

impl From<AuditError> for ContractError {
    fn from(e: AuditError) -> Self {
        match e {
            AuditError::Identity(e) => Self::Identity(e),
            AuditError::Storage(e) => Self::Store(e),
            AuditError::DuplicateLogId { log_id } => {
                Self::already_exists(Namespace::Audit, &log_id)
            },
            AuditError::Serialization(msg) => Self::Serialization(msg),
        }
    }
}

/// Result type for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ContractError::not_found(Namespace::Evidence, "EV9").to_string(),
            "evidence not found: EV9"
        );
        assert_eq!(
            ContractError::already_exists(Namespace::Evidence, "EV1").to_string(),
            "evidence already exists: EV1"
        );
    }

    #[test]
    fn test_directory_not_found_maps_to_participant_kind() {
        let e: ContractError = DirectoryError::NotFound {
            participant_id: "bob".into(),
        }
        .into();
        assert!(matches!(e, ContractError::NotFound { kind: "participant", .. }));
    }

    #[test]
    fn test_duplicate_log_id_maps_to_transaction_log_kind() {
        let e: ContractError = AuditError::DuplicateLogId {
            log_id: "LOG-t1".into(),
        }
        .into();
        assert!(matches!(e, ContractError::AlreadyExists { kind: "transaction log", .. }));
        assert_eq!(e.to_string(), "transaction log already exists: LOG-t1");
    }

    #[test]
    fn test_policy_unauthorized_maps_through() {
        let e: ContractError = PolicyError::Unauthorized {
            org: "Org3MSP".into(),
            action: "CreateEvidence".into(),
        }
        .into();
        assert_eq!(
            e.to_string(),
            "organization Org3MSP is not authorized to perform CreateEvidence"
        );
    }
}
