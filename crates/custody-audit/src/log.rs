//! Audit log - attribution, staging and the ordered listing.

use std::fmt::Write as _;
use std::sync::Arc;

use custody_core::{InvocationContext, LedgerTimestamp, Namespace};
use custody_directory::{DirectoryError, ParticipantDirectory};
use custody_storage::{KvStore, ScopedKvStore, WriteBatch};
use tracing::{debug, warn};

use crate::caller::{CallerResolution, resolve_caller};
use crate::entry::{AuditAction, TransactionLog};
use crate::error::{AuditError, AuditResult};

/// The ledger's transaction log.
#[derive(Clone)]
pub struct AuditLog {
    store: ScopedKvStore,
    directory: ParticipantDirectory,
}

impl AuditLog {
    /// Create an audit log over `store`, attributing entries through
    /// `directory`.
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>, directory: ParticipantDirectory) -> Self {
        Self {
            store: ScopedKvStore::new(store, Namespace::Audit),
            directory,
        }
    }

    /// Build the entry for `action` on `evidence_id`, stamped `at`, and
    /// stage it into `batch`. Nothing is written until the batch is
    /// committed.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Identity`] if the caller id, organization or
    /// transaction id is unavailable, [`AuditError::DuplicateLogId`] if the
    /// transaction already has an entry, or [`AuditError::Storage`] if the
    /// entry cannot be staged.
    pub async fn stage(
        &self,
        batch: &mut WriteBatch,
        ctx: &dyn InvocationContext,
        action: AuditAction,
        evidence_id: &str,
        at: LedgerTimestamp,
    ) -> AuditResult<TransactionLog> {
        let tx = ctx.transaction_id()?;
        let log_id = TransactionLog::log_id_for(&tx);
        // Entries are written once; a reused transaction id must not replace one.
        if self.store.exists(&log_id).await? {
            warn!(%log_id, "transaction id already has an audit entry");
            return Err(AuditError::DuplicateLogId { log_id });
        }
        let performed_by = self.performed_by(ctx).await?;

        let entry = TransactionLog {
            log_id,
            action,
            evidence_id: evidence_id.to_owned(),
            timestamp: at.format(),
            performed_by,
        };

        debug!(
            log_id = %entry.log_id,
            action = %entry.action,
            evidence_id = %entry.evidence_id,
            "Staging audit entry"
        );

        self.store.stage_json(batch, &entry.log_id, &entry)?;
        Ok(entry)
    }

    /// Write a standalone entry for `action` on `evidence_id`.
    ///
    /// # Errors
    ///
    /// Same as [`stage`](Self::stage), plus any commit failure.
    pub async fn append(
        &self,
        ctx: &dyn InvocationContext,
        action: AuditAction,
        evidence_id: &str,
    ) -> AuditResult<TransactionLog> {
        let mut batch = WriteBatch::new();
        let entry = self
            .stage(&mut batch, ctx, action, evidence_id, ctx.timestamp())
            .await?;
        self.store.commit(batch).await?;
        Ok(entry)
    }

    /// Every readable entry, ordered by timestamp ascending.
    ///
    /// Entries sharing a timestamp keep store (log id) order. Entries that
    /// fail to decode are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Storage`] if the scan fails.
    pub async fn entries(&self) -> AuditResult<Vec<TransactionLog>> {
        let raw = self.store.scan().await?;
        let mut entries: Vec<TransactionLog> = raw
            .into_iter()
            .filter_map(|kv| match serde_json::from_slice(&kv.value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(key = %kv.key, error = %e, "Skipping unreadable audit entry");
                    None
                },
            })
            .collect();
        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(entries)
    }

    /// Entries concerning one evidence record, in listing order.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Storage`] if the scan fails.
    pub async fn entries_for(&self, evidence_id: &str) -> AuditResult<Vec<TransactionLog>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .filter(|e| e.evidence_id == evidence_id)
            .collect())
    }

    /// The numbered listing of every entry, one `"<n> - <json>\n"` line each.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Storage`] if the scan fails, or
    /// [`AuditError::Serialization`] if an entry cannot be re-encoded.
    pub async fn transaction_logs(&self) -> AuditResult<String> {
        render_listing(&self.entries().await?)
    }

    async fn performed_by(&self, ctx: &dyn InvocationContext) -> AuditResult<String> {
        let caller = ctx.caller_id()?;
        let resolution = resolve_caller(&caller);
        match &resolution {
            CallerResolution::Decoded(id) => debug!(caller = %id, "caller id decoded"),
            CallerResolution::Raw(id) => debug!(caller = %id, "caller id used raw"),
        }

        match self.directory.lookup(resolution.value()).await {
            Ok(participant) => Ok(participant.role),
            Err(e) => {
                if matches!(e, DirectoryError::Storage(_)) {
                    warn!(caller = %resolution.value(), error = %e, "participant lookup failed");
                } else {
                    debug!(caller = %resolution.value(), error = %e, "caller not registered");
                }
                let org = ctx.org_id()?;
                Ok(TransactionLog::unregistered(org.as_str()))
            },
        }
    }
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog").finish_non_exhaustive()
    }
}

/// Render entries as `"<n> - <json>\n"` lines numbered from 1.
///
/// # Errors
///
/// Returns [`AuditError::Serialization`] if an entry cannot be encoded.
pub fn render_listing(entries: &[TransactionLog]) -> AuditResult<String> {
    let mut out = String::new();
    for (n, entry) in (1_usize..).zip(entries) {
        let json =
            serde_json::to_string(entry).map_err(|e| AuditError::Serialization(e.to_string()))?;
        let _ = writeln!(out, "{n} - {json}");
    }
    Ok(out)
}
