//! TOML configuration file I/O
//!
//! Handles locating and loading the configuration TOML file
//! in the user's configuration directory.

use crate::config::TotpConfig;
use crate::error::{ConfigError, ShopAuthError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default enrollment store file name
const STORE_FILE_NAME: &str = "enrollments.toml";

/// Get the default configuration directory
///
/// Returns ~/.config/shopauth, or SHOPAUTH_CONFIG_DIR if set
pub fn get_config_dir() -> Result<PathBuf, ShopAuthError> {
    if let Ok(config_dir) = std::env::var("SHOPAUTH_CONFIG_DIR") {
        return Ok(PathBuf::from(config_dir));
    }

    let home = std::env::var("HOME").map_err(|_| {
        ShopAuthError::Config(ConfigError::IoError {
            message: "HOME environment variable not set".to_string(),
        })
    })?;

    Ok(PathBuf::from(home).join(".config").join("shopauth"))
}

/// Get the default configuration file path
pub fn get_config_path() -> Result<PathBuf, ShopAuthError> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Resolve where enrollments are stored for this configuration
///
/// A relative `store_path` is taken relative to the configuration directory.
pub fn resolve_store_path(config: &TotpConfig) -> Result<PathBuf, ShopAuthError> {
    match &config.store_path {
        Some(path) if path.is_absolute() => Ok(path.clone()),
        Some(path) => Ok(get_config_dir()?.join(path)),
        None => Ok(get_config_dir()?.join(STORE_FILE_NAME)),
    }
}

/// Load configuration from the default location, falling back to defaults
/// when no file exists
pub fn load_config() -> Result<TotpConfig, ShopAuthError> {
    load_config_or_default(get_config_path()?)
}

/// Load configuration from `path`, or defaults if the file is missing
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<TotpConfig, ShopAuthError> {
    if !path.as_ref().exists() {
        debug!(
            "No configuration at {:?}, using defaults",
            path.as_ref()
        );
        return Ok(TotpConfig::default());
    }
    load_config_from_path(path)
}

/// Load configuration from a specific TOML file
pub fn load_config_from_path<P: AsRef<Path>>(path: P) -> Result<TotpConfig, ShopAuthError> {
    let contents = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ShopAuthError::Config(ConfigError::LoadFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        }),
        _ => ShopAuthError::Config(ConfigError::IoError {
            message: format!("Failed to read config file: {}", e),
        }),
    })?;

    let config: TotpConfig = toml::from_str(&contents).map_err(|e| {
        ShopAuthError::Config(ConfigError::IoError {
            message: format!("Failed to parse TOML: {}", e),
        })
    })?;

    config
        .validate()
        .map_err(|e| ShopAuthError::Config(ConfigError::ValidationError { message: e }))?;

    debug!(
        issuer = %config.issuer,
        period = config.period,
        digits = config.digits,
        skew = config.skew,
        "Loaded configuration"
    );

    Ok(config)
}
