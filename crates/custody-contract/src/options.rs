//! Behavior switches of the custody contract.

use custody_core::ExistingRecordPolicy;

/// Tunable contract behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustodyOptions {
    /// What `CreateEvidence` does when the evidence id is taken.
    pub on_existing_evidence: ExistingRecordPolicy,
    /// What `RegisterParticipant` does when the participant id is taken.
    pub on_existing_participant: ExistingRecordPolicy,
    /// Whether deleted evidence refuses further transfers and deletes.
    pub deleted_is_terminal: bool,
}

impl Default for CustodyOptions {
    fn default() -> Self {
        Self {
            on_existing_evidence: ExistingRecordPolicy::Reject,
            on_existing_participant: ExistingRecordPolicy::Replace,
            deleted_is_terminal: false,
        }
    }
}
