//! The authorization gate.

use custody_core::OrgId;
use tracing::{trace, warn};

use crate::error::{PolicyError, PolicyResult};
use crate::table::{PolicyAction, PolicyTable};

/// Authorizes actions by the caller's organization.
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    table: PolicyTable,
}

impl PolicyEngine {
    /// Create an engine over `table`.
    #[must_use]
    pub fn new(table: PolicyTable) -> Self {
        Self { table }
    }

    /// The table this engine enforces.
    #[must_use]
    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    /// Admit or reject `org` for `action`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Unauthorized`] if `org` is not on the
    /// action's allow-list.
    pub fn authorize(&self, action: PolicyAction, org: &OrgId) -> PolicyResult<()> {
        if self.table.allow_list(action).permits(org) {
            trace!(%action, %org, "authorized");
            return Ok(());
        }

        warn!(%action, %org, "authorization denied");
        Err(PolicyError::Unauthorized {
            org: org.to_string(),
            action: action.to_string(),
        })
    }
}
