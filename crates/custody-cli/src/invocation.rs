//! Invocation context built from command-line flags.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use custody_core::{IdentityError, IdentityResult, InvocationContext, OrgId, TxId};

/// Identity of one CLI invocation.
///
/// The caller id is presented base64-encoded, the way a certificate-backed
/// identity layer hands it to the contract.
#[derive(Debug, Clone)]
pub(crate) struct CliInvocation {
    org: Option<OrgId>,
    caller: String,
    tx_id: TxId,
}

impl CliInvocation {
    pub(crate) fn new(org: Option<String>, caller: &str, tx_id: Option<String>) -> Self {
        Self {
            org: org.filter(|o| !o.trim().is_empty()).map(OrgId::new),
            caller: STANDARD.encode(caller),
            tx_id: TxId::new(tx_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string())),
        }
    }

    pub(crate) fn tx_id(&self) -> &TxId {
        &self.tx_id
    }
}

impl InvocationContext for CliInvocation {
    fn org_id(&self) -> IdentityResult<OrgId> {
        self.org
            .clone()
            .ok_or_else(|| IdentityError::OrgUnavailable("no --org given".into()))
    }

    fn caller_id(&self) -> IdentityResult<String> {
        Ok(self.caller.clone())
    }

    fn transaction_id(&self) -> IdentityResult<TxId> {
        Ok(self.tx_id.clone())
    }
}
