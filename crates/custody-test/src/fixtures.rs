//! Test fixtures for invocation contexts.

use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{TimeZone, Utc};

use custody_core::{
    IdentityError, IdentityResult, InvocationContext, LedgerTimestamp, OrgId, TxId,
};

/// Organization allowed to create, transfer and delete under the default policy.
pub const ORG1: &str = "Org1MSP";
/// Organization allowed to transfer and delete under the default policy.
pub const ORG2: &str = "Org2MSP";
/// Organization with no mutating rights under the default policy.
pub const ORG3: &str = "Org3MSP";

static NEXT_TX: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique transaction id (`tx-000001`, `tx-000002`, ...).
#[must_use]
pub fn next_tx_id() -> TxId {
    let n = NEXT_TX.fetch_add(1, Ordering::Relaxed);
    TxId::new(format!("tx-{n:06}"))
}

/// Which identity lookup a [`TestInvocation`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityFault {
    /// `org_id()` fails.
    Org,
    /// `caller_id()` fails.
    Caller,
    /// `transaction_id()` fails.
    Transaction,
}

/// A scripted [`InvocationContext`].
///
/// One value models one invocation: its transaction id is fixed at
/// construction. Build a fresh one per contract call.
#[derive(Debug, Clone)]
pub struct TestInvocation {
    org: OrgId,
    caller: String,
    tx_id: TxId,
    timestamp: Option<LedgerTimestamp>,
    fault: Option<IdentityFault>,
}

impl TestInvocation {
    /// An invocation by `caller` from `org`, with a fresh transaction id.
    ///
    /// The caller id is passed through as-is (not base64-encoded).
    #[must_use]
    pub fn new(org: impl Into<String>, caller: impl Into<String>) -> Self {
        Self {
            org: OrgId::new(org),
            caller: caller.into(),
            tx_id: next_tx_id(),
            timestamp: None,
            fault: None,
        }
    }

    /// An invocation whose caller id arrives base64-encoded, as issued by
    /// the identity layer.
    #[must_use]
    pub fn encoded(org: impl Into<String>, caller: &str) -> Self {
        Self::new(org, STANDARD.encode(caller.as_bytes()))
    }

    /// Override the transaction id.
    #[must_use]
    pub fn with_tx_id(mut self, tx_id: impl Into<String>) -> Self {
        self.tx_id = TxId::new(tx_id);
        self
    }

    /// Pin the invocation timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: LedgerTimestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Make one identity lookup fail.
    #[must_use]
    pub fn failing(mut self, fault: IdentityFault) -> Self {
        self.fault = Some(fault);
        self
    }

    /// The transaction id this invocation reports.
    #[must_use]
    pub fn tx_id(&self) -> &TxId {
        &self.tx_id
    }
}

impl InvocationContext for TestInvocation {
    fn org_id(&self) -> IdentityResult<OrgId> {
        if self.fault == Some(IdentityFault::Org) {
            return Err(IdentityError::OrgUnavailable("scripted failure".into()));
        }
        Ok(self.org.clone())
    }

    fn caller_id(&self) -> IdentityResult<String> {
        if self.fault == Some(IdentityFault::Caller) {
            return Err(IdentityError::CallerUnavailable("scripted failure".into()));
        }
        Ok(self.caller.clone())
    }

    fn transaction_id(&self) -> IdentityResult<TxId> {
        if self.fault == Some(IdentityFault::Transaction) {
            return Err(IdentityError::TransactionUnavailable(
                "scripted failure".into(),
            ));
        }
        Ok(self.tx_id.clone())
    }

    fn timestamp(&self) -> LedgerTimestamp {
        self.timestamp.unwrap_or_else(LedgerTimestamp::now)
    }
}

/// A fixed timestamp, `2024-01-01 00:00:00` plus `seconds`.
///
/// # Panics
///
/// Panics if the resulting time is out of range.
#[must_use]
pub fn test_timestamp(seconds: i64) -> LedgerTimestamp {
    let base = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid base timestamp");
    let dt = base
        .checked_add_signed(chrono::Duration::seconds(seconds))
        .expect("timestamp in range");
    LedgerTimestamp::from_datetime(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_ids_are_unique() {
        let a = TestInvocation::new(ORG1, "alice");
        let b = TestInvocation::new(ORG1, "alice");
        assert_ne!(a.tx_id(), b.tx_id());
    }

    #[test]
    fn test_encoded_caller() {
        let ctx = TestInvocation::encoded(ORG2, "x509::CN=lab");
        let caller = ctx.caller_id().unwrap();
        let decoded = STANDARD.decode(caller).unwrap();
        assert_eq!(decoded, b"x509::CN=lab");
    }

    #[test]
    fn test_fault_injection() {
        let ctx = TestInvocation::new(ORG1, "alice").failing(IdentityFault::Transaction);
        assert!(ctx.transaction_id().is_err());
        assert!(ctx.org_id().is_ok());
    }

    #[test]
    fn test_pinned_timestamp() {
        let ctx = TestInvocation::new(ORG1, "alice").at(test_timestamp(61));
        assert_eq!(ctx.timestamp().format(), "2024-01-01 00:01:01");
    }
}
