//! Configuration file loading and value resolution
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is never fatal: a warning is logged and defaults apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "IPGEO_CONFIG";

/// Config file contents
///
/// Every key is optional; absent keys fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the lookup service (address is appended as a path segment)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Maximum number of lookups in flight
    #[serde(default)]
    pub pool_size: Option<usize>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Client-side throttle; absent or 0 disables it
    #[serde(default)]
    pub requests_per_minute: Option<u32>,

    /// Default field selection, by catalog name
    #[serde(default)]
    pub fields: Option<Vec<String>>,

    /// Default CSV destination
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Locate the config file: CLI argument, then `IPGEO_CONFIG`, then the
/// per-user config directory (`~/.config/ipgeo/config.toml` on Linux).
///
/// Returns `None` only when the platform has no config directory.
pub fn config_file_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("ipgeo").join("config.toml"))
}

/// Load the TOML config, falling back to defaults when the file is absent
///
/// A file that exists but cannot be read or parsed is an error.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        warn!("No config directory available on this platform, using defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Write a config file atomically, creating parent directories as needed
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    // Temp file + rename so a reader never sees a half-written config
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}

/// Read and parse an environment variable
///
/// Unset or blank yields `Ok(None)`; a value that does not parse is a
/// configuration error naming the variable.
pub fn env_override<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("{}={:?} is invalid: {}", name, raw, e))),
        _ => Ok(None),
    }
}

/// Pick the first present value in priority order: CLI, environment, TOML, default
pub fn resolve<T>(cli: Option<T>, env: Option<T>, toml: Option<T>, default: T) -> T {
    cli.or(env).or(toml).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_priority() {
        assert_eq!(resolve(Some(1), Some(2), Some(3), 4), 1);
        assert_eq!(resolve(None, Some(2), Some(3), 4), 2);
        assert_eq!(resolve(None, None, Some(3), 4), 3);
        assert_eq!(resolve::<u32>(None, None, None, 4), 4);
    }

    #[test]
    fn test_empty_toml_parses_to_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_cli_path_wins() {
        let path = PathBuf::from("/tmp/explicit.toml");
        assert_eq!(config_file_path(Some(&path)), Some(path));
    }
}
