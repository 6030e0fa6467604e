//! Participant registration and lookup.

use std::sync::Arc;

use custody_core::{ExistingRecordPolicy, InvocationContext, Namespace};
use custody_storage::{KvStore, ScopedKvStore};
use tracing::{debug, info};

use crate::error::{DirectoryError, DirectoryResult};
use crate::participant::Participant;

/// Participant directory backed by the participant namespace.
#[derive(Debug, Clone)]
pub struct ParticipantDirectory {
    store: ScopedKvStore,
    on_existing: ExistingRecordPolicy,
}

impl ParticipantDirectory {
    /// Create a directory over `store`.
    ///
    /// Re-registering an id replaces the stored record.
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store: ScopedKvStore::new(store, Namespace::Participant),
            on_existing: ExistingRecordPolicy::Replace,
        }
    }

    /// Set what registration does when the id is already taken.
    #[must_use]
    pub fn with_existing_policy(mut self, policy: ExistingRecordPolicy) -> Self {
        self.on_existing = policy;
        self
    }

    /// Register `participant_id` with `role` under the caller's own
    /// organization.
    ///
    /// # Errors
    ///
    /// - [`DirectoryError::Identity`] if the caller's organization is unavailable
    /// - [`DirectoryError::AlreadyExists`] if the id is taken and the
    ///   directory rejects re-registration
    /// - [`DirectoryError::Storage`] if the store fails
    pub async fn register(
        &self,
        ctx: &dyn InvocationContext,
        participant_id: &str,
        role: &str,
    ) -> DirectoryResult<Participant> {
        let org = ctx.org_id()?;

        if self.on_existing == ExistingRecordPolicy::Reject
            && self.store.exists(participant_id).await?
        {
            return Err(DirectoryError::AlreadyExists {
                participant_id: participant_id.to_owned(),
            });
        }

        let participant = Participant {
            participant_id: participant_id.to_owned(),
            role: role.to_owned(),
            org_id: org.to_string(),
        };
        let bytes = serde_json::to_vec(&participant)
            .map_err(|e| DirectoryError::Serialization(e.to_string()))?;
        self.store.set(participant_id, bytes).await?;

        info!(participant_id, role, %org, "participant registered");
        Ok(participant)
    }

    /// Look up a participant.
    ///
    /// # Errors
    ///
    /// - [`DirectoryError::NotFound`] if nothing is stored under the id
    /// - [`DirectoryError::Corrupt`] if the stored bytes do not decode
    /// - [`DirectoryError::Storage`] if the store fails
    pub async fn lookup(&self, participant_id: &str) -> DirectoryResult<Participant> {
        let Some(bytes) = self.store.get(participant_id).await? else {
            debug!(participant_id, "participant not registered");
            return Err(DirectoryError::NotFound {
                participant_id: participant_id.to_owned(),
            });
        };

        serde_json::from_slice(&bytes).map_err(|e| DirectoryError::Corrupt {
            participant_id: participant_id.to_owned(),
            reason: e.to_string(),
        })
    }
}
