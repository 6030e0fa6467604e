//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge the user file: the explicit `--config` path if given (must
//!    exist), otherwise `~/.custody/config.toml` (optional)
//! 3. Apply env var fallbacks for fields no file set
//! 4. Deserialize merged tree → `Config`
//! 5. Validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{FileFields, deep_merge_tracking};
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// A loaded configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The validated configuration.
    pub config: Config,
    /// The custody home directory (`~/.custody` unless overridden).
    pub custody_home: PathBuf,
    /// Config files that contributed, in load order.
    pub loaded_files: Vec<String>,
}

impl ResolvedConfig {
    /// The effective data directory of the persistent store.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.config.storage.resolve_data_dir(&self.custody_home)
    }
}

/// Load the configuration with layered precedence.
///
/// `explicit` is a config file the user named; it must exist.
/// `custody_home_override` replaces `~/.custody` for discovery.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is unreadable or malformed,
/// or if the merged configuration fails validation.
pub fn load(
    explicit: Option<&Path>,
    custody_home_override: Option<&Path>,
) -> ConfigResult<ResolvedConfig> {
    load_with_env(explicit, custody_home_override, &collect_env_vars())
}

/// [`load`] with an explicit environment snapshot.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env<S: ::std::hash::BuildHasher>(
    explicit: Option<&Path>,
    custody_home_override: Option<&Path>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    let custody_home = match custody_home_override {
        Some(h) => h.to_path_buf(),
        None => home_directory()?.join(".custody"),
    };

    // 1. Embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut fields = FileFields::new();
    let mut loaded_files = Vec::new();

    // 2. User file.
    let user_file = if let Some(path) = explicit {
        Some((read_toml(path)?, path.to_path_buf()))
    } else {
        let path = custody_home.join("config.toml");
        try_load_file(&path)?.map(|overlay| (overlay, path))
    };

    if let Some((overlay, path)) = user_file {
        deep_merge_tracking(&mut merged, &overlay, "", &mut fields);
        info!(path = %path.display(), "loaded user config");
        loaded_files.push(path.display().to_string());
    }

    // 3. Env fallbacks.
    let env_count = apply_env_fallbacks(&mut merged, &fields, env_vars)?;
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    // 4. Deserialize.
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    // 5. Validate.
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        custody_home,
        loaded_files,
    })
}

/// Load a config from a single file on top of the defaults (no env vars).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or parsed, or the
/// result is invalid.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    let overlay = read_toml(path)?;
    deep_merge_tracking(&mut merged, &overlay, "", &mut FileFields::new());

    let config: Config = merged
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Read and parse a file that must exist.
fn read_toml(path: &Path) -> ConfigResult<toml::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_checked(path, &content)
}

/// Try to load a file, returning `None` if it doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };
    parse_checked(path, &content).map(Some)
}

fn parse_checked(path: &Path, content: &str) -> ConfigResult<toml::Value> {
    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

/// Determine the user's home directory.
fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}
