//! Configuration module
//!
//! Handles loading and saving the two-factor configuration from TOML files.

use crate::auth::totp::{SecretDecoding, TotpParams, DEFAULT_DIGITS, DEFAULT_PERIOD, DEFAULT_SKEW};
use crate::types::DEFAULT_ISSUER;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub mod toml_config;

/// Largest accepted clock-skew window, in steps on each side
pub const MAX_SKEW: u64 = 10;

/// Two-factor configuration
///
/// Contains only non-sensitive settings. Enrolled secrets live in the
/// enrollment store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotpConfig {
    /// Issuer shown in authenticator apps
    pub issuer: String,

    /// Time step in seconds
    pub period: u64,

    /// Code length
    pub digits: u32,

    /// Adjacent steps accepted on each side of the current one
    pub skew: u64,

    /// Base32 decoding mode for secrets
    pub secret_decoding: SecretDecoding,

    /// Enrollment file location (defaults to `enrollments.toml` next to the config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    /// Principal id to display label (usually an email address)
    pub accounts: BTreeMap<String, String>,
}

impl TotpConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.issuer.trim().is_empty() {
            return Err("Issuer cannot be empty".to_string());
        }

        if self.issuer.contains(':') {
            return Err("Issuer cannot contain ':'".to_string());
        }

        if self.period == 0 {
            return Err("Period cannot be zero".to_string());
        }

        if !(6..=8).contains(&self.digits) {
            return Err("Digits must be between 6 and 8".to_string());
        }

        if self.skew > MAX_SKEW {
            return Err(format!("Skew cannot exceed {} steps", MAX_SKEW));
        }

        Ok(())
    }

    /// TOTP parameters derived from this configuration
    pub fn params(&self) -> TotpParams {
        TotpParams {
            period: self.period,
            digits: self.digits,
            skew: self.skew,
            decoding: self.secret_decoding,
        }
    }
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            period: DEFAULT_PERIOD,
            digits: DEFAULT_DIGITS,
            skew: DEFAULT_SKEW,
            secret_decoding: SecretDecoding::Lenient,
            store_path: None,
            accounts: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TotpConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.params(), TotpParams::default());
    }

    #[test]
    fn test_invalid_configs() {
        let cases: Vec<(fn(&mut TotpConfig), &str)> = vec![
            (|c| c.issuer = " ".to_string(), "Issuer cannot be empty"),
            (|c| c.issuer = "RL:Auto".to_string(), "Issuer cannot contain ':'"),
            (|c| c.period = 0, "Period cannot be zero"),
            (|c| c.digits = 5, "Digits must be between 6 and 8"),
            (|c| c.digits = 9, "Digits must be between 6 and 8"),
            (|c| c.skew = 11, "Skew cannot exceed 10 steps"),
        ];

        for (mutate, message) in cases {
            let mut config = TotpConfig::default();
            mutate(&mut config);
            assert_eq!(config.validate().unwrap_err(), message);
        }
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: TotpConfig = toml::from_str("skew = 2\nsecret_decoding = \"strict\"\n").unwrap();
        assert_eq!(config.skew, 2);
        assert_eq!(config.secret_decoding, SecretDecoding::Strict);
        assert_eq!(config.issuer, DEFAULT_ISSUER);
        assert_eq!(config.period, 30);
    }
}
