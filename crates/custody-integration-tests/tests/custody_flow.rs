//! End-to-end custody flows over the in-memory store.
//!
//! Each test drives the public contract surface the way three
//! organizations sharing one ledger would.

#![allow(clippy::arithmetic_side_effects)]

use std::sync::Arc;

use custody_audit::AuditAction;
use custody_contract::{ContractError, CustodyContract, CustodyOptions};
use custody_core::Namespace;
use custody_policy::{PolicyEngine, PolicyTable};
use custody_storage::{KvStore, MemoryKvStore};
use custody_test::{
    FailingKvStore, ORG1, ORG2, ORG3, TestInvocation, init_test_tracing, test_timestamp,
};

fn ledger() -> (CustodyContract, Arc<MemoryKvStore>) {
    init_test_tracing();
    let store = Arc::new(MemoryKvStore::new());
    let contract = CustodyContract::new(
        Arc::clone(&store) as Arc<dyn KvStore>,
        PolicyEngine::new(PolicyTable::default()),
    );
    (contract, store)
}

fn at(org: &str, caller: &str, seconds: i64) -> TestInvocation {
    TestInvocation::encoded(org, caller).at(test_timestamp(seconds))
}

#[tokio::test]
async fn ev1_scenario() {
    let (contract, _) = ledger();

    contract
        .create_evidence(&at(ORG1, "officer", 0), "EV1", "knife")
        .await
        .unwrap();
    let ev = contract
        .get_evidence_details(&at(ORG1, "officer", 1), "EV1")
        .await
        .unwrap();
    assert_eq!(ev.owner, "FirstResponder");
    assert_eq!(ev.transfer_history, vec!["FirstResponder"]);

    let ev = contract
        .transfer_evidence(&at(ORG2, "courier", 10), "EV1", "Lab")
        .await
        .unwrap();
    assert_eq!(ev.owner, "Lab");
    assert_eq!(ev.transfer_history, vec!["FirstResponder", "Lab"]);

    let err = contract
        .transfer_evidence(&at(ORG3, "intruder", 20), "EV1", "X")
        .await
        .unwrap_err();
    assert!(matches!(err, ContractError::Unauthorized { .. }));
    let ev = contract
        .get_evidence_details(&at(ORG1, "officer", 30), "EV1")
        .await
        .unwrap();
    assert_eq!(ev.owner, "Lab");

    let listing = contract
        .get_transaction_logs(&at(ORG1, "officer", 40))
        .await
        .unwrap();
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("1 - "));
    assert!(lines[1].starts_with("2 - "));

    let first: serde_json::Value = serde_json::from_str(&lines[0]["1 - ".len()..]).unwrap();
    let second: serde_json::Value = serde_json::from_str(&lines[1]["2 - ".len()..]).unwrap();
    assert_eq!(first["action"], "Create");
    assert_eq!(first["evidenceID"], "EV1");
    assert_eq!(second["action"], "Transfer");
    assert_eq!(second["evidenceID"], "EV1");
}

#[tokio::test]
async fn register_then_lookup_returns_registrar_org() {
    let (contract, _) = ledger();
    contract
        .register_participant(&TestInvocation::new(ORG2, "admin"), "bob", "Analyst")
        .await
        .unwrap();

    let bob = contract
        .get_participant(&TestInvocation::new(ORG3, "anyone"), "bob")
        .await
        .unwrap();
    assert_eq!(bob.org_id, ORG2);
    assert_eq!(bob.role, "Analyst");
}

#[tokio::test]
async fn only_org1_creates() {
    let (contract, store) = ledger();
    for org in [ORG2, ORG3] {
        let err = contract
            .create_evidence(&TestInvocation::new(org, "c"), "EV9", "glove")
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Unauthorized { .. }), "{org}");
    }
    assert!(store.scan(Namespace::Evidence).await.unwrap().is_empty());
    assert!(store.scan(Namespace::Audit).await.unwrap().is_empty());
}

#[tokio::test]
async fn org3_cannot_delete() {
    let (contract, _) = ledger();
    contract
        .create_evidence(&at(ORG1, "c", 0), "EV2", "phone")
        .await
        .unwrap();

    let err = contract
        .delete_evidence(&at(ORG3, "c", 5), "EV2")
        .await
        .unwrap_err();
    assert!(matches!(err, ContractError::Unauthorized { .. }));

    let ev = contract
        .get_evidence_details(&at(ORG3, "c", 6), "EV2")
        .await
        .unwrap();
    assert_eq!(ev.owner, "FirstResponder");
}

#[tokio::test]
async fn n_transfers_grow_both_histories() {
    let (contract, _) = ledger();
    contract
        .create_evidence(&at(ORG1, "c", 0), "EV3", "laptop")
        .await
        .unwrap();

    let holders = ["Lab", "Archive", "Court", "Lab"];
    for (i, holder) in (1_i64..).zip(holders) {
        let org = if i % 2 == 0 { ORG1 } else { ORG2 };
        contract
            .transfer_evidence(&at(org, "c", i * 60), "EV3", holder)
            .await
            .unwrap();
    }

    let ev = contract
        .get_evidence_details(&at(ORG1, "c", 1_000), "EV3")
        .await
        .unwrap();
    assert_eq!(ev.transfer_history.len(), holders.len() + 1);
    assert_eq!(ev.timestamp_history.len(), holders.len() + 1);
    assert_eq!(ev.transfer_history.last(), Some(&ev.owner));
    assert_eq!(ev.timestamp_history[1], "2024-01-01 00:01:00");
}

#[tokio::test]
async fn delete_keeps_histories() {
    let (contract, _) = ledger();
    contract
        .create_evidence(&at(ORG1, "c", 0), "EV4", "shoe")
        .await
        .unwrap();
    let before = contract
        .transfer_evidence(&at(ORG2, "c", 10), "EV4", "Lab")
        .await
        .unwrap();

    let after = contract
        .delete_evidence(&at(ORG2, "c", 20), "EV4")
        .await
        .unwrap();
    assert_eq!(after.owner, "DELETED");
    assert_eq!(after.transfer_history, before.transfer_history);
    assert_eq!(after.timestamp_history, before.timestamp_history);

    let actions: Vec<AuditAction> = contract
        .evidence_audit_trail(&at(ORG1, "c", 30), "EV4")
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.action)
        .collect();
    assert_eq!(
        actions,
        vec![AuditAction::Create, AuditAction::Transfer, AuditAction::Delete]
    );
}

#[tokio::test]
async fn listing_is_chronological_across_evidence() {
    let (contract, _) = ledger();
    // Invocation order differs from timestamp order.
    contract
        .create_evidence(&at(ORG1, "c", 300), "B", "late")
        .await
        .unwrap();
    contract
        .create_evidence(&at(ORG1, "c", 100), "A", "early")
        .await
        .unwrap();
    contract
        .transfer_evidence(&at(ORG2, "c", 200), "A", "Lab")
        .await
        .unwrap();

    let entries = contract.audit().entries().await.unwrap();
    let stamps: Vec<&str> = entries.iter().map(|e| e.timestamp.as_str()).collect();
    let mut sorted = stamps.clone();
    sorted.sort_unstable();
    assert_eq!(stamps, sorted);
    assert_eq!(entries[0].evidence_id, "A");
    assert_eq!(entries[2].evidence_id, "B");

    let listing = contract
        .get_transaction_logs(&at(ORG3, "c", 400))
        .await
        .unwrap();
    for (n, line) in (1..).zip(listing.lines()) {
        assert!(line.starts_with(&format!("{n} - ")), "{line}");
    }
}

#[tokio::test]
async fn audit_attributes_registered_callers_by_role() {
    let (contract, _) = ledger();
    contract
        .register_participant(&TestInvocation::new(ORG1, "admin"), "alice", "Investigator")
        .await
        .unwrap();

    contract
        .create_evidence(&at(ORG1, "alice", 0), "EV5", "hair")
        .await
        .unwrap();
    contract
        .transfer_evidence(&at(ORG2, "mallory", 10), "EV5", "Lab")
        .await
        .unwrap();

    let trail = contract
        .evidence_audit_trail(&at(ORG1, "alice", 20), "EV5")
        .await
        .unwrap();
    assert_eq!(trail[0].performed_by, "Investigator");
    assert_eq!(trail[1].performed_by, "Unregistered(Org2MSP)");
}

#[tokio::test]
async fn recreate_is_rejected_by_default() {
    let (contract, _) = ledger();
    contract
        .create_evidence(&at(ORG1, "c", 0), "EV6", "first")
        .await
        .unwrap();
    let err = contract
        .create_evidence(&at(ORG1, "c", 10), "EV6", "second")
        .await
        .unwrap_err();
    assert!(matches!(err, ContractError::AlreadyExists { .. }));

    let ev = contract
        .get_evidence_details(&at(ORG1, "c", 20), "EV6")
        .await
        .unwrap();
    assert_eq!(ev.description, "first");
    assert_eq!(contract.audit().entries().await.unwrap().len(), 1);
}

#[tokio::test]
async fn terminal_delete_blocks_later_mutations() {
    let store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
    let contract = CustodyContract::with_options(
        Arc::clone(&store),
        PolicyEngine::new(PolicyTable::default()),
        CustodyOptions {
            deleted_is_terminal: true,
            ..CustodyOptions::default()
        },
    );
    contract
        .create_evidence(&at(ORG1, "c", 0), "EV7", "bag")
        .await
        .unwrap();
    contract
        .delete_evidence(&at(ORG1, "c", 10), "EV7")
        .await
        .unwrap();

    let err = contract
        .transfer_evidence(&at(ORG2, "c", 20), "EV7", "Lab")
        .await
        .unwrap_err();
    assert!(matches!(err, ContractError::EvidenceDeleted { .. }));

    let ev = contract
        .get_evidence_details(&at(ORG1, "c", 30), "EV7")
        .await
        .unwrap();
    assert_eq!(ev.owner, "DELETED");
    assert_eq!(ev.transfer_history.len(), 1);
    assert_eq!(contract.audit().entries().await.unwrap().len(), 2);
}

#[tokio::test]
async fn reused_tx_id_does_not_replace_audit_entry() {
    let (contract, _) = ledger();

    contract
        .create_evidence(&at(ORG1, "c", 0).with_tx_id("t1"), "EV1", "knife")
        .await
        .unwrap();
    let err = contract
        .transfer_evidence(&at(ORG2, "c", 10).with_tx_id("t1"), "EV1", "Lab")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ContractError::AlreadyExists {
            kind: "transaction log",
            ..
        }
    ));

    let ev = contract
        .get_evidence_details(&at(ORG1, "c", 20), "EV1")
        .await
        .unwrap();
    assert_eq!(ev.owner, "FirstResponder");
    assert_eq!(ev.transfer_history.len(), 1);

    let listing = contract
        .get_transaction_logs(&at(ORG1, "c", 30))
        .await
        .unwrap();
    assert_eq!(listing.lines().count(), 1);
    assert!(listing.contains("\"Create\""));
    assert!(!listing.contains("Transfer"));
}

#[tokio::test]
async fn failed_commit_writes_neither_record_nor_audit() {
    let store = FailingKvStore::new();
    let contract = CustodyContract::new(
        Arc::clone(&store) as Arc<dyn KvStore>,
        PolicyEngine::new(PolicyTable::default()),
    );

    store.fail_commits(true);
    let err = contract
        .create_evidence(&at(ORG1, "c", 0), "EV8", "ring")
        .await
        .unwrap_err();
    assert!(matches!(err, ContractError::Store(_)));
    store.fail_commits(false);

    let err = contract
        .get_evidence_details(&at(ORG1, "c", 1), "EV8")
        .await
        .unwrap_err();
    assert!(matches!(err, ContractError::NotFound { .. }));
    assert!(contract.audit().entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_and_absent_records_are_distinguished() {
    let store = FailingKvStore::new();
    let contract = CustodyContract::new(
        Arc::clone(&store) as Arc<dyn KvStore>,
        PolicyEngine::new(PolicyTable::default()),
    );
    store
        .plant(Namespace::Evidence, "EVX", b"{not json")
        .await
        .unwrap();

    let corrupt = contract
        .get_evidence_details(&at(ORG1, "c", 0), "EVX")
        .await
        .unwrap_err();
    assert!(matches!(corrupt, ContractError::Corrupt { .. }));

    let absent = contract
        .get_evidence_details(&at(ORG1, "c", 0), "EVY")
        .await
        .unwrap_err();
    assert!(matches!(absent, ContractError::NotFound { .. }));
}
