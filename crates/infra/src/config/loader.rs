//! Configuration loader
//!
//! Loads the repository configuration from environment variables or a
//! config file, falling back to built-in defaults when neither source is
//! present. Both knobs are optional in every source.
//!
//! ## Loading Strategy
//! 1. Environment variables, when at least one is set
//! 2. Otherwise, the first config file found in the probe locations
//! 3. Otherwise, [`RepositoryConfig::default`]
//!
//! ## Environment Variables
//! - `MAPVAULT_MAX_RETRY_ATTEMPTS`: Retry budget for transient failures
//! - `MAPVAULT_BACKOFF_INCREMENT_MS`: Linear backoff increment in ms
//!
//! ## File Locations
//! The loader probes `./mapvault.toml` then `./config/mapvault.toml`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use mapvault_domain::{MapVaultError, RepositoryConfig, Result};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `MapVaultError::Config` if an environment variable or config
/// file is present but malformed. Absence of both is not an error.
pub fn load() -> Result<RepositoryConfig> {
    if let Some(config) = load_from_env()? {
        tracing::info!("configuration loaded from environment variables");
        return Ok(config);
    }
    match probe_config_paths() {
        Some(path) => load_from_file(Some(&path)),
        None => {
            tracing::debug!("no configuration source found, using defaults");
            Ok(RepositoryConfig::default())
        }
    }
}

/// Load configuration from environment variables
///
/// Returns `Ok(None)` when neither variable is set; a set variable that
/// fails to parse is an error rather than a silent default.
pub fn load_from_env() -> Result<Option<RepositoryConfig>> {
    let max_retry_attempts = env_parsed::<u32>("MAPVAULT_MAX_RETRY_ATTEMPTS")?;
    let backoff_increment_ms = env_parsed::<u64>("MAPVAULT_BACKOFF_INCREMENT_MS")?;
    if max_retry_attempts.is_none() && backoff_increment_ms.is_none() {
        return Ok(None);
    }

    let defaults = RepositoryConfig::default();
    Ok(Some(RepositoryConfig {
        max_retry_attempts: max_retry_attempts.unwrap_or(defaults.max_retry_attempts),
        backoff_increment_ms: backoff_increment_ms.unwrap_or(defaults.backoff_increment_ms),
    }))
}

/// Load configuration from a TOML file
///
/// If `path` is `None`, probes the standard locations and falls back to
/// defaults when nothing is found. An explicit path must exist.
///
/// # Errors
/// Returns `MapVaultError::Config` if the file is missing (explicit path
/// only), unreadable, or not valid TOML.
pub fn load_from_file(path: Option<&Path>) -> Result<RepositoryConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MapVaultError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p.to_path_buf()
        }
        None => match probe_config_paths() {
            Some(p) => p,
            None => return Ok(RepositoryConfig::default()),
        },
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MapVaultError::Config(format!("failed to read config file: {e}")))?;
    toml::from_str(&contents)
        .map_err(|e| MapVaultError::Config(format!("invalid config file: {e}")))
}

/// Probe the standard locations for a configuration file
///
/// Returns the first existing candidate, or `None`.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    [cwd.join("mapvault.toml"), cwd.join("config/mapvault.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn env_parsed<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| MapVaultError::Config(format!("invalid {key}: {e}"))),
        Err(_) => Ok(None),
    }
}
