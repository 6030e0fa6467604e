//! Subcommand handlers.
//!
//! Each handler invokes one contract operation and renders the result to
//! stdout. Logs go to stderr, so `--format json` output stays pipeable.

use anyhow::{Context, Result};
use custody_contract::{CustodyContract, Evidence, Participant, TransactionLog};

use crate::invocation::CliInvocation;
use crate::theme::Theme;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Styled, human-readable.
    Pretty,
    /// One JSON document per command.
    Json,
}

pub(crate) struct Session<'a> {
    pub(crate) contract: &'a CustodyContract,
    pub(crate) ctx: &'a CliInvocation,
    pub(crate) format: OutputFormat,
}

impl Session<'_> {
    pub(crate) async fn register(&self, participant_id: &str, role: &str) -> Result<()> {
        let participant = self
            .contract
            .register_participant(self.ctx, participant_id, role)
            .await
            .with_context(|| format!("RegisterParticipant {participant_id}"))?;
        self.print_participant(&participant, Some("participant registered"))
    }

    pub(crate) async fn participant(&self, participant_id: &str) -> Result<()> {
        let participant = self
            .contract
            .get_participant(self.ctx, participant_id)
            .await
            .with_context(|| format!("GetParticipant {participant_id}"))?;
        self.print_participant(&participant, None)
    }

    pub(crate) async fn create(&self, evidence_id: &str, description: &str) -> Result<()> {
        let evidence = self
            .contract
            .create_evidence(self.ctx, evidence_id, description)
            .await
            .with_context(|| format!("CreateEvidence {evidence_id}"))?;
        self.print_evidence(&evidence, Some("evidence created"))
    }

    pub(crate) async fn transfer(&self, evidence_id: &str, new_owner: &str) -> Result<()> {
        let evidence = self
            .contract
            .transfer_evidence(self.ctx, evidence_id, new_owner)
            .await
            .with_context(|| format!("TransferEvidence {evidence_id}"))?;
        self.print_evidence(&evidence, Some("custody transferred"))
    }

    pub(crate) async fn delete(&self, evidence_id: &str) -> Result<()> {
        let evidence = self
            .contract
            .delete_evidence(self.ctx, evidence_id)
            .await
            .with_context(|| format!("DeleteEvidence {evidence_id}"))?;
        self.print_evidence(&evidence, Some("evidence deleted"))
    }

    pub(crate) async fn show(&self, evidence_id: &str) -> Result<()> {
        let evidence = self
            .contract
            .get_evidence_details(self.ctx, evidence_id)
            .await
            .with_context(|| format!("GetEvidenceDetails {evidence_id}"))?;
        self.print_evidence(&evidence, None)
    }

    pub(crate) async fn logs(&self, evidence_id: Option<&str>) -> Result<()> {
        if let Some(evidence_id) = evidence_id {
            let entries = self
                .contract
                .evidence_audit_trail(self.ctx, evidence_id)
                .await
                .with_context(|| format!("audit trail of {evidence_id}"))?;
            return self.print_trail(evidence_id, &entries);
        }

        let listing = self
            .contract
            .get_transaction_logs(self.ctx)
            .await
            .context("GetTransactionLogs")?;
        match self.format {
            OutputFormat::Json => {
                let entries = self.contract.audit().entries().await?;
                println!("{}", serde_json::to_string_pretty(&entries)?);
            },
            OutputFormat::Pretty => {
                println!("{}", Theme::header("Transaction logs"));
                println!("{}", Theme::separator());
                if listing.is_empty() {
                    println!("{}", Theme::dimmed("(empty)"));
                } else {
                    print!("{listing}");
                }
            },
        }
        Ok(())
    }

    fn print_participant(&self, participant: &Participant, done: Option<&str>) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(participant)?),
            OutputFormat::Pretty => {
                if let Some(done) = done {
                    println!("{}", Theme::success(done));
                }
                println!("{}", Theme::kv("participant", &participant.participant_id));
                println!("{}", Theme::kv("role", &participant.role));
                println!("{}", Theme::kv("org", &participant.org_id));
            },
        }
        Ok(())
    }

    fn print_evidence(&self, evidence: &Evidence, done: Option<&str>) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(evidence)?),
            OutputFormat::Pretty => {
                if let Some(done) = done {
                    println!("{}", Theme::success(done));
                }
                println!("{}", Theme::header(&evidence.evidence_id));
                println!("{}", Theme::kv("description", &evidence.description));
                println!("{}", Theme::kv("owner", &Theme::owner(&evidence.owner)));
                if evidence.is_deleted() {
                    println!("{}", Theme::warning("record is soft-deleted"));
                }
                println!("{}", Theme::separator());
                for (step, event) in (1_usize..).zip(evidence.custody_chain()) {
                    println!(
                        "{step:>3}. {} {}",
                        Theme::dimmed(event.timestamp),
                        event.owner
                    );
                }
                println!("{}", Theme::dimmed(&format!("tx {}", self.ctx.tx_id())));
            },
        }
        Ok(())
    }

    fn print_trail(&self, evidence_id: &str, entries: &[TransactionLog]) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(entries)?),
            OutputFormat::Pretty => {
                println!("{}", Theme::header(&format!("Audit trail of {evidence_id}")));
                println!("{}", Theme::separator());
                if entries.is_empty() {
                    println!("{}", Theme::dimmed("(no entries)"));
                }
                for entry in entries {
                    println!(
                        "{} {:<8} {} {}",
                        Theme::dimmed(&entry.timestamp),
                        entry.action,
                        entry.performed_by,
                        Theme::dimmed(&entry.log_id)
                    );
                }
            },
        }
        Ok(())
    }
}
