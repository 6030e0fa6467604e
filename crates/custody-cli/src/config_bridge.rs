//! Bridge from `custody_config::Config` to domain types.
//!
//! The config crate has no dependencies on other custody crates. This
//! module translates its sections into the policy table, contract options
//! and log config the binary runs with.

use custody_config::{Config, OnExisting, PolicySection};
use custody_contract::CustodyOptions;
use custody_core::ExistingRecordPolicy;
use custody_policy::{
    AllowList, PolicyAction, PolicyEngine, PolicyError, PolicyResult, PolicyTable,
};
use custody_telemetry::{LogConfig, LogFormat};

/// Convert the `[policy]` section to a [`PolicyTable`].
///
/// Absent keys and wildcard lists leave the action unrestricted.
///
/// # Errors
///
/// Returns an error if a key names no action or a restricted list is
/// unusable.
pub fn to_policy_table(cfg: &Config) -> PolicyResult<PolicyTable> {
    let mut table = PolicyTable::permissive();
    for (key, orgs) in cfg.policy.rules() {
        let Some(orgs) = orgs else { continue };
        let action = PolicyAction::from_config_key(key).ok_or_else(|| PolicyError::InvalidRule {
            action: key.to_owned(),
            reason: "no such action".to_owned(),
        })?;
        if PolicySection::is_wildcard(orgs) {
            continue;
        }
        table = table.with_rule(action, AllowList::only(orgs.iter().map(String::as_str)))?;
    }
    Ok(table)
}

/// Convert the `[policy]` section to a ready [`PolicyEngine`].
///
/// # Errors
///
/// Same as [`to_policy_table`].
pub fn to_policy_engine(cfg: &Config) -> PolicyResult<PolicyEngine> {
    to_policy_table(cfg).map(PolicyEngine::new)
}

/// Convert the `[custody]` section to [`CustodyOptions`].
#[must_use]
pub fn to_custody_options(cfg: &Config) -> CustodyOptions {
    CustodyOptions {
        on_existing_evidence: existing_policy(cfg.custody.on_existing_evidence),
        on_existing_participant: existing_policy(cfg.custody.on_existing_participant),
        deleted_is_terminal: cfg.custody.deleted_is_terminal,
    }
}

fn existing_policy(on_existing: OnExisting) -> ExistingRecordPolicy {
    match on_existing {
        OnExisting::Reject => ExistingRecordPolicy::Reject,
        OnExisting::Replace => ExistingRecordPolicy::Replace,
    }
}

/// Convert the `[logging]` section to [`LogConfig`].
///
/// Formats are validated at load time; anything else falls back to compact.
#[must_use]
pub fn to_log_config(cfg: &Config) -> LogConfig {
    let format = cfg
        .logging
        .format
        .parse()
        .unwrap_or(LogFormat::Compact);

    let mut log_config = LogConfig::new(&cfg.logging.level).with_format(format);
    for directive in &cfg.logging.directives {
        log_config = log_config.with_directive(directive);
    }
    log_config
}
