//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Config, PolicySection};

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_policy(config)?;
    validate_storage(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_policy(config: &Config) -> ConfigResult<()> {
    for (key, rule) in config.policy.rules() {
        let Some(orgs) = rule else {
            continue;
        };
        let field = format!("policy.{key}");

        if orgs.is_empty() {
            return Err(ConfigError::ValidationError {
                field,
                message: "allow-list is empty; remove the key or use [\"*\"] to admit everyone"
                    .to_owned(),
            });
        }
        if orgs.iter().any(|o| o.trim().is_empty()) {
            return Err(ConfigError::ValidationError {
                field,
                message: "organization id must not be empty".to_owned(),
            });
        }
        if PolicySection::is_wildcard(orgs) && orgs.len() > 1 {
            return Err(ConfigError::ValidationError {
                field,
                message: "\"*\" cannot be combined with named organizations".to_owned(),
            });
        }
    }
    Ok(())
}

fn validate_storage(config: &Config) -> ConfigResult<()> {
    if config
        .storage
        .data_dir
        .as_ref()
        .is_some_and(|d| d.trim().is_empty())
    {
        return Err(ConfigError::ValidationError {
            field: "storage.data_dir".to_owned(),
            message: "data directory must not be empty".to_owned(),
        });
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        });
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        });
    }

    Ok(())
}
