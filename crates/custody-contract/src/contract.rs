//! The custody contract surface.

use std::sync::Arc;

use custody_audit::{AuditAction, AuditLog, TransactionLog};
use custody_core::{ExistingRecordPolicy, InvocationContext, LedgerTimestamp, Namespace};
use custody_directory::{Participant, ParticipantDirectory};
use custody_policy::{PolicyAction, PolicyEngine};
use custody_storage::{KvStore, ScopedKvStore, WriteBatch};
use tracing::{Span, debug, field, info, instrument, warn};

use crate::error::{ContractError, ContractResult};
use crate::evidence::Evidence;
use crate::options::CustodyOptions;

/// Chain-of-custody contract over a shared store.
///
/// Holds no ledger state of its own: every operation reads what it needs
/// from the store and writes back through one atomic batch.
#[derive(Clone)]
pub struct CustodyContract {
    evidence: ScopedKvStore,
    policy: PolicyEngine,
    directory: ParticipantDirectory,
    audit: AuditLog,
    options: CustodyOptions,
}

impl CustodyContract {
    /// Create a contract enforcing `policy` over `store`, with default
    /// [`CustodyOptions`].
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>, policy: PolicyEngine) -> Self {
        Self::with_options(store, policy, CustodyOptions::default())
    }

    /// Create a contract with explicit options.
    #[must_use]
    pub fn with_options(
        store: Arc<dyn KvStore>,
        policy: PolicyEngine,
        options: CustodyOptions,
    ) -> Self {
        let directory = ParticipantDirectory::new(Arc::clone(&store))
            .with_existing_policy(options.on_existing_participant);
        let audit = AuditLog::new(Arc::clone(&store), directory.clone());
        Self {
            evidence: ScopedKvStore::new(store, Namespace::Evidence),
            policy,
            directory,
            audit,
            options,
        }
    }

    /// The options in effect.
    #[must_use]
    pub fn options(&self) -> &CustodyOptions {
        &self.options
    }

    /// The underlying audit log.
    #[must_use]
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// `RegisterParticipant`: record `participant_id` with `role` under the
    /// caller's organization.
    ///
    /// # Errors
    ///
    /// [`ContractError::AlreadyExists`] when re-registration is rejected,
    /// otherwise identity or store failures.
    #[instrument(name = "RegisterParticipant", skip_all, fields(tx_id = field::Empty))]
    pub async fn register_participant(
        &self,
        ctx: &dyn InvocationContext,
        participant_id: &str,
        role: &str,
    ) -> ContractResult<Participant> {
        record_tx(ctx);
        self.authorize(ctx, PolicyAction::RegisterParticipant)?;
        Ok(self.directory.register(ctx, participant_id, role).await?)
    }

    /// `GetParticipant`: look up a participant.
    ///
    /// # Errors
    ///
    /// [`ContractError::NotFound`] or [`ContractError::Corrupt`] when the
    /// record is absent or unreadable.
    #[instrument(name = "GetParticipant", skip_all, fields(tx_id = field::Empty))]
    pub async fn get_participant(
        &self,
        ctx: &dyn InvocationContext,
        participant_id: &str,
    ) -> ContractResult<Participant> {
        record_tx(ctx);
        self.authorize(ctx, PolicyAction::GetParticipant)?;
        Ok(self.directory.lookup(participant_id).await?)
    }

    /// `CreateEvidence`: open a custody record held by `FirstResponder`.
    ///
    /// # Errors
    ///
    /// - [`ContractError::Unauthorized`] if the caller's organization may not create
    /// - [`ContractError::AlreadyExists`] if the id is taken and creation
    ///   does not replace
    /// - identity, serialization or store failures; nothing is written
    #[instrument(name = "CreateEvidence", skip_all, fields(tx_id = field::Empty))]
    pub async fn create_evidence(
        &self,
        ctx: &dyn InvocationContext,
        evidence_id: &str,
        description: &str,
    ) -> ContractResult<Evidence> {
        record_tx(ctx);
        self.authorize(ctx, PolicyAction::CreateEvidence)?;

        if self.options.on_existing_evidence == ExistingRecordPolicy::Reject
            && self.evidence.exists(evidence_id).await?
        {
            warn!(evidence_id, "evidence id already in use");
            return Err(ContractError::already_exists(Namespace::Evidence, evidence_id));
        }

        let at = ctx.timestamp();
        let evidence = Evidence::new(evidence_id, description, at);
        self.commit_with_audit(ctx, &evidence, AuditAction::Create, at)
            .await?;

        info!(evidence_id, "evidence created");
        Ok(evidence)
    }

    /// `TransferEvidence`: hand the record to `new_owner`.
    ///
    /// `new_owner` is not checked against the directory.
    ///
    /// # Errors
    ///
    /// - [`ContractError::Unauthorized`] if the caller's organization may not transfer
    /// - [`ContractError::NotFound`] / [`ContractError::Corrupt`] for an unreadable record
    /// - [`ContractError::EvidenceDeleted`] when deletion is terminal
    #[instrument(name = "TransferEvidence", skip_all, fields(tx_id = field::Empty))]
    pub async fn transfer_evidence(
        &self,
        ctx: &dyn InvocationContext,
        evidence_id: &str,
        new_owner: &str,
    ) -> ContractResult<Evidence> {
        record_tx(ctx);
        self.authorize(ctx, PolicyAction::TransferEvidence)?;

        let mut evidence = self.load_live(evidence_id).await?;
        let previous = evidence.owner.clone();
        let at = ctx.timestamp();
        evidence.transfer(new_owner, at);
        self.commit_with_audit(ctx, &evidence, AuditAction::Transfer, at)
            .await?;

        info!(evidence_id, from = %previous, to = new_owner, "evidence transferred");
        Ok(evidence)
    }

    /// `DeleteEvidence`: soft-delete the record, keeping its history.
    ///
    /// # Errors
    ///
    /// Same as [`transfer_evidence`](Self::transfer_evidence).
    #[instrument(name = "DeleteEvidence", skip_all, fields(tx_id = field::Empty))]
    pub async fn delete_evidence(
        &self,
        ctx: &dyn InvocationContext,
        evidence_id: &str,
    ) -> ContractResult<Evidence> {
        record_tx(ctx);
        self.authorize(ctx, PolicyAction::DeleteEvidence)?;

        let mut evidence = self.load_live(evidence_id).await?;
        evidence.mark_deleted();
        self.commit_with_audit(ctx, &evidence, AuditAction::Delete, ctx.timestamp())
            .await?;

        info!(evidence_id, "evidence deleted");
        Ok(evidence)
    }

    /// `GetEvidenceDetails`: read the current record.
    ///
    /// # Errors
    ///
    /// [`ContractError::NotFound`] or [`ContractError::Corrupt`].
    #[instrument(name = "GetEvidenceDetails", skip_all, fields(tx_id = field::Empty))]
    pub async fn get_evidence_details(
        &self,
        ctx: &dyn InvocationContext,
        evidence_id: &str,
    ) -> ContractResult<Evidence> {
        record_tx(ctx);
        self.authorize(ctx, PolicyAction::ReadEvidence)?;
        self.load(evidence_id).await
    }

    /// `GetTransactionLogs`: the numbered, chronological audit listing.
    ///
    /// # Errors
    ///
    /// Store failures while scanning the log.
    #[instrument(name = "GetTransactionLogs", skip_all, fields(tx_id = field::Empty))]
    pub async fn get_transaction_logs(
        &self,
        ctx: &dyn InvocationContext,
    ) -> ContractResult<String> {
        record_tx(ctx);
        self.authorize(ctx, PolicyAction::ListTransactionLogs)?;
        Ok(self.audit.transaction_logs().await?)
    }

    /// Audit entries for one evidence record, oldest first.
    ///
    /// Governed by the same rule as `GetTransactionLogs`.
    ///
    /// # Errors
    ///
    /// Store failures while scanning the log.
    #[instrument(name = "EvidenceAuditTrail", skip_all, fields(tx_id = field::Empty))]
    pub async fn evidence_audit_trail(
        &self,
        ctx: &dyn InvocationContext,
        evidence_id: &str,
    ) -> ContractResult<Vec<TransactionLog>> {
        record_tx(ctx);
        self.authorize(ctx, PolicyAction::ListTransactionLogs)?;
        Ok(self.audit.entries_for(evidence_id).await?)
    }

    fn authorize(&self, ctx: &dyn InvocationContext, action: PolicyAction) -> ContractResult<()> {
        let org = ctx.org_id()?;
        self.policy.authorize(action, &org)?;
        if action.is_mutating() {
            debug!(%action, %org, "mutation authorized");
        }
        Ok(())
    }

    async fn load(&self, evidence_id: &str) -> ContractResult<Evidence> {
        let bytes = self
            .evidence
            .get(evidence_id)
            .await?
            .ok_or_else(|| ContractError::not_found(Namespace::Evidence, evidence_id))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ContractError::corrupt(Namespace::Evidence, evidence_id, e))
    }

    /// Load a record that is about to be mutated.
    async fn load_live(&self, evidence_id: &str) -> ContractResult<Evidence> {
        let evidence = self.load(evidence_id).await?;
        if self.options.deleted_is_terminal && evidence.is_deleted() {
            warn!(evidence_id, "refusing to mutate deleted evidence");
            return Err(ContractError::EvidenceDeleted {
                evidence_id: evidence_id.to_owned(),
            });
        }
        Ok(evidence)
    }

    /// Write `evidence` and its audit entry, stamped `at`, as one batch.
    async fn commit_with_audit(
        &self,
        ctx: &dyn InvocationContext,
        evidence: &Evidence,
        action: AuditAction,
        at: LedgerTimestamp,
    ) -> ContractResult<TransactionLog> {
        let mut batch = WriteBatch::new();
        self.evidence
            .stage_json(&mut batch, &evidence.evidence_id, evidence)?;
        let entry = self
            .audit
            .stage(&mut batch, ctx, action, &evidence.evidence_id, at)
            .await?;
        self.evidence.commit(batch).await?;
        Ok(entry)
    }
}

impl std::fmt::Debug for CustodyContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustodyContract")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Attach the invocation's transaction id to the current operation span.
fn record_tx(ctx: &dyn InvocationContext) {
    if let Ok(tx) = ctx.transaction_id() {
        Span::current().record("tx_id", tx.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_storage::MemoryKvStore;
    use custody_test::{
        FailingKvStore, IdentityFault, ORG1, ORG2, ORG3, TestInvocation, test_timestamp,
    };

    fn contract() -> CustodyContract {
        CustodyContract::new(Arc::new(MemoryKvStore::new()), PolicyEngine::default())
    }

    fn org1() -> TestInvocation {
        TestInvocation::new(ORG1, "org1-admin")
    }

    #[tokio::test]
    async fn test_create_and_read() {
        let c = contract();
        let ctx = org1().at(test_timestamp(0));
        c.create_evidence(&ctx, "EV1", "Knife").await.unwrap();

        let ev = c.get_evidence_details(&org1(), "EV1").await.unwrap();
        assert_eq!(ev.description, "Knife");
        assert_eq!(ev.owner, "FirstResponder");
        assert_eq!(ev.timestamp_history, vec!["2024-01-01 00:00:00"]);
    }

    /// A context whose clock advances one minute on every read.
    struct TickingInvocation {
        inner: TestInvocation,
        ticks: std::sync::atomic::AtomicI64,
    }

    impl TickingInvocation {
        fn new(org: &str, first_tick: i64) -> Self {
            Self {
                inner: TestInvocation::new(org, "ticker"),
                ticks: std::sync::atomic::AtomicI64::new(first_tick),
            }
        }
    }

    impl InvocationContext for TickingInvocation {
        fn org_id(&self) -> custody_core::IdentityResult<custody_core::OrgId> {
            self.inner.org_id()
        }

        fn caller_id(&self) -> custody_core::IdentityResult<String> {
            self.inner.caller_id()
        }

        fn transaction_id(&self) -> custody_core::IdentityResult<custody_core::TxId> {
            self.inner.transaction_id()
        }

        fn timestamp(&self) -> custody_core::LedgerTimestamp {
            let n = self
                .ticks
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            test_timestamp(n.saturating_mul(60))
        }
    }

    #[tokio::test]
    async fn test_history_and_audit_share_one_timestamp() {
        let c = contract();
        let created = c
            .create_evidence(&TickingInvocation::new(ORG1, 0), "EV1", "Knife")
            .await
            .unwrap();
        let moved = c
            .transfer_evidence(&TickingInvocation::new(ORG2, 10), "EV1", "Lab")
            .await
            .unwrap();

        let trail = c.audit().entries_for("EV1").await.unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].timestamp, created.timestamp_history[0]);
        assert_eq!(trail[1].timestamp, moved.timestamp_history[1]);
    }

    #[tokio::test]
    async fn test_reused_tx_id_is_rejected_without_writing() {
        let c = contract();
        c.create_evidence(&org1().with_tx_id("t1"), "EV1", "Knife")
            .await
            .unwrap();

        let err = c
            .transfer_evidence(
                &TestInvocation::new(ORG2, "x").with_tx_id("t1"),
                "EV1",
                "Lab",
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ContractError::AlreadyExists {
                kind: "transaction log",
                ..
            }
        ));
        let ev = c.get_evidence_details(&org1(), "EV1").await.unwrap();
        assert_eq!(ev.owner, "FirstResponder");
    }

    #[tokio::test]
    async fn test_create_requires_org1() {
        let c = contract();
        for org in [ORG2, ORG3] {
            let err = c
                .create_evidence(&TestInvocation::new(org, "x"), "EV1", "Knife")
                .await
                .unwrap_err();
            assert!(matches!(err, ContractError::Unauthorized { .. }));
        }
        let err = c.get_evidence_details(&org1(), "EV1").await.unwrap_err();
        assert!(matches!(err, ContractError::NotFound { .. }));
        assert_eq!(c.get_transaction_logs(&org1()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_recreate_rejected_by_default() {
        let c = contract();
        c.create_evidence(&org1(), "EV1", "Knife").await.unwrap();
        let err = c
            .create_evidence(&org1(), "EV1", "Gun")
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::AlreadyExists { kind: "evidence", .. }));

        let ev = c.get_evidence_details(&org1(), "EV1").await.unwrap();
        assert_eq!(ev.description, "Knife");
        assert_eq!(c.audit().entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_recreate_replaces_when_configured() {
        let options = CustodyOptions {
            on_existing_evidence: ExistingRecordPolicy::Replace,
            ..CustodyOptions::default()
        };
        let c = CustodyContract::with_options(
            Arc::new(MemoryKvStore::new()),
            PolicyEngine::default(),
            options,
        );
        c.create_evidence(&org1(), "EV1", "Knife").await.unwrap();
        c.transfer_evidence(&org1(), "EV1", "Lab").await.unwrap();
        c.create_evidence(&org1(), "EV1", "Gun").await.unwrap();

        let ev = c.get_evidence_details(&org1(), "EV1").await.unwrap();
        assert_eq!(ev.description, "Gun");
        assert_eq!(ev.transfer_history, vec!["FirstResponder"]);
    }

    #[tokio::test]
    async fn test_transfer_appends_history() {
        let c = contract();
        c.create_evidence(&org1().at(test_timestamp(0)), "EV1", "Knife")
            .await
            .unwrap();
        let ctx = TestInvocation::new(ORG2, "lab").at(test_timestamp(30));
        let ev = c.transfer_evidence(&ctx, "EV1", "Lab").await.unwrap();

        assert_eq!(ev.owner, "Lab");
        assert_eq!(ev.transfer_history, vec!["FirstResponder", "Lab"]);
        assert_eq!(ev.timestamp_history[1], "2024-01-01 00:00:30");
        assert_eq!(c.get_evidence_details(&org1(), "EV1").await.unwrap(), ev);
    }

    #[tokio::test]
    async fn test_transfer_missing_evidence() {
        let err = contract()
            .transfer_evidence(&org1(), "EV404", "Lab")
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::NotFound { kind: "evidence", .. }));
    }

    #[tokio::test]
    async fn test_transfer_unauthorized_leaves_record() {
        let c = contract();
        let created = c.create_evidence(&org1(), "EV1", "Knife").await.unwrap();
        let err = c
            .transfer_evidence(&TestInvocation::new(ORG3, "x"), "EV1", "Thief")
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Unauthorized { .. }));
        assert_eq!(c.get_evidence_details(&org1(), "EV1").await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_delete_is_soft() {
        let c = contract();
        c.create_evidence(&org1(), "EV1", "Knife").await.unwrap();
        c.transfer_evidence(&org1(), "EV1", "Lab").await.unwrap();
        let ev = c
            .delete_evidence(&TestInvocation::new(ORG2, "x"), "EV1")
            .await
            .unwrap();

        assert!(ev.is_deleted());
        assert_eq!(ev.transfer_history, vec!["FirstResponder", "Lab"]);
        assert_eq!(ev.timestamp_history.len(), 2);
    }

    #[tokio::test]
    async fn test_transfer_after_delete_allowed_by_default() {
        let c = contract();
        c.create_evidence(&org1(), "EV1", "Knife").await.unwrap();
        c.delete_evidence(&org1(), "EV1").await.unwrap();
        let ev = c.transfer_evidence(&org1(), "EV1", "Lab").await.unwrap();
        assert_eq!(ev.owner, "Lab");
    }

    #[tokio::test]
    async fn test_terminal_delete_blocks_mutation() {
        let options = CustodyOptions {
            deleted_is_terminal: true,
            ..CustodyOptions::default()
        };
        let c = CustodyContract::with_options(
            Arc::new(MemoryKvStore::new()),
            PolicyEngine::default(),
            options,
        );
        c.create_evidence(&org1(), "EV1", "Knife").await.unwrap();
        let deleted = c.delete_evidence(&org1(), "EV1").await.unwrap();

        let err = c
            .transfer_evidence(&org1(), "EV1", "Lab")
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::EvidenceDeleted { .. }));
        let err = c.delete_evidence(&org1(), "EV1").await.unwrap_err();
        assert!(matches!(err, ContractError::EvidenceDeleted { .. }));

        assert_eq!(c.get_evidence_details(&org1(), "EV1").await.unwrap(), deleted);
        assert_eq!(c.audit().entries().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_audit_staging_writes_nothing() {
        let c = contract();
        let ctx = org1().failing(IdentityFault::Caller);
        let err = c.create_evidence(&ctx, "EV1", "Knife").await.unwrap_err();
        assert!(matches!(err, ContractError::Identity(_)));

        let err = c.get_evidence_details(&org1(), "EV1").await.unwrap_err();
        assert!(matches!(err, ContractError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_failed_commit_writes_nothing() {
        let store = FailingKvStore::new();
        let c = CustodyContract::new(store.clone(), PolicyEngine::default());
        c.create_evidence(&org1(), "EV1", "Knife").await.unwrap();

        store.fail_commits(true);
        let err = c
            .transfer_evidence(&org1(), "EV1", "Lab")
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Store(_)));

        store.fail_commits(false);
        let ev = c.get_evidence_details(&org1(), "EV1").await.unwrap();
        assert_eq!(ev.owner, "FirstResponder");
        assert_eq!(c.audit().entries().await.unwrap().len(), 1);
        assert_eq!(store.commit_count(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_evidence() {
        let store = FailingKvStore::new();
        store
            .plant(Namespace::Evidence, "EV1", b"{\"evidenceID\":")
            .await
            .unwrap();
        let c = CustodyContract::new(store, PolicyEngine::default());

        let err = c.get_evidence_details(&org1(), "EV1").await.unwrap_err();
        assert!(matches!(err, ContractError::Corrupt { kind: "evidence", .. }));
    }

    #[tokio::test]
    async fn test_identity_org_failure_is_identity_error() {
        let ctx = org1().failing(IdentityFault::Org);
        let err = contract()
            .get_evidence_details(&ctx, "EV1")
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Identity(_)));
    }

    #[tokio::test]
    async fn test_participants_and_attribution() {
        let c = contract();
        let registrar = TestInvocation::new(ORG2, "registrar");
        c.register_participant(&registrar, "alice", "Investigator")
            .await
            .unwrap();
        let p = c.get_participant(&org1(), "alice").await.unwrap();
        assert_eq!(p.org_id, ORG2);

        let alice = TestInvocation::encoded(ORG1, "alice");
        c.create_evidence(&alice, "EV1", "Knife").await.unwrap();

        let trail = c.evidence_audit_trail(&org1(), "EV1").await.unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].performed_by, "Investigator");
        assert_eq!(trail[0].action, AuditAction::Create);
    }

    #[tokio::test]
    async fn test_missing_participant() {
        let err = contract()
            .get_participant(&org1(), "ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::NotFound { kind: "participant", .. }));
    }
}
