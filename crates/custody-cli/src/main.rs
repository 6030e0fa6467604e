//! Custody CLI - drive the chain-of-custody contract from a shell.
//!
//! Every invocation is one transaction against the persistent ledger in the
//! configured data directory. The caller's organization comes from `--org`
//! and is what the policy engine authorizes.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use custody_contract::CustodyContract;
use custody_storage::{KvStore, SurrealKvStore};

mod commands;
pub mod config_bridge;
mod invocation;
mod theme;

use commands::{OutputFormat, Session};
use invocation::CliInvocation;
use theme::Theme;

/// Custody - chain-of-custody ledger
#[derive(Parser)]
#[command(name = "custody")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Organization of the caller
    #[arg(long, global = true, env = "CUSTODY_ORG")]
    org: Option<String>,

    /// Caller identifier
    #[arg(long, global = true, env = "CUSTODY_CALLER", default_value = "cli")]
    caller: String,

    /// Transaction id (defaults to a fresh UUID)
    #[arg(long, global = true)]
    tx_id: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a participant under the caller's organization
    Register {
        /// Participant id
        participant_id: String,
        /// Role label
        role: String,
    },

    /// Show a registered participant
    Participant {
        /// Participant id
        participant_id: String,
    },

    /// Open a custody record held by `FirstResponder`
    Create {
        /// Evidence id
        evidence_id: String,
        /// Free-text description
        description: String,
    },

    /// Hand evidence to a new owner
    Transfer {
        /// Evidence id
        evidence_id: String,
        /// New holder
        new_owner: String,
    },

    /// Soft-delete evidence, keeping its history
    Delete {
        /// Evidence id
        evidence_id: String,
    },

    /// Show an evidence record and its custody chain
    Show {
        /// Evidence id
        evidence_id: String,
    },

    /// List the transaction log
    Logs {
        /// Only entries for this evidence id
        #[arg(long)]
        evidence: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved =
        custody_config::Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    let mut log_config = config_bridge::to_log_config(&resolved.config);
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = custody_telemetry::setup_logging(&log_config) {
        // A bad [logging] section still gets the stock stderr subscriber.
        eprintln!("Invalid logging configuration ({e}), using defaults");
        if let Err(e) = custody_telemetry::setup_default_logging() {
            eprintln!("Failed to initialize logging: {e}");
        }
    }
    tracing::debug!(files = ?resolved.loaded_files, "configuration loaded");

    let policy = config_bridge::to_policy_engine(&resolved.config)
        .context("invalid [policy] section")?;
    let options = config_bridge::to_custody_options(&resolved.config);

    let data_dir = resolved.data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    let store = Arc::new(
        SurrealKvStore::open(&data_dir)
            .with_context(|| format!("failed to open ledger at {}", data_dir.display()))?,
    );

    let shared: Arc<dyn KvStore> = Arc::clone(&store) as Arc<dyn KvStore>;
    let contract = CustodyContract::with_options(shared, policy, options);
    let ctx = CliInvocation::new(cli.org, &cli.caller, cli.tx_id);
    let session = Session {
        contract: &contract,
        ctx: &ctx,
        format: cli.format,
    };

    let outcome = match &cli.command {
        Commands::Register {
            participant_id,
            role,
        } => session.register(participant_id, role).await,
        Commands::Participant { participant_id } => session.participant(participant_id).await,
        Commands::Create {
            evidence_id,
            description,
        } => session.create(evidence_id, description).await,
        Commands::Transfer {
            evidence_id,
            new_owner,
        } => session.transfer(evidence_id, new_owner).await,
        Commands::Delete { evidence_id } => session.delete(evidence_id).await,
        Commands::Show { evidence_id } => session.show(evidence_id).await,
        Commands::Logs { evidence } => session.logs(evidence.as_deref()).await,
    };

    if let Err(e) = store.close().await {
        tracing::warn!(error = %e, "failed to close ledger store");
    }

    if let Err(e) = outcome {
        eprintln!("{}", Theme::error(&format!("{e:#}")));
        std::process::exit(1);
    }
    Ok(())
}
