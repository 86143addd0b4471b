//! Type definitions and wrappers for secure data handling
//!
//! This module provides type-safe wrappers for sensitive data using the
//! secrecy crate to prevent accidental exposure in logs or debug output.

use secrecy::{ExposeSecret, Secret};

/// Wrapper for a Base32-encoded TOTP secret
///
/// This type ensures TOTP secrets are never accidentally logged or exposed
/// in debug output, maintaining security throughout the application.
#[derive(Clone, Debug)]
pub struct OtpSecret(Secret<String>);

impl OtpSecret {
    /// Create a new OtpSecret from a Base32-encoded string
    pub fn new(secret: String) -> Self {
        Self(Secret::new(secret))
    }

    /// Expose the secret value (use with caution!)
    ///
    /// This should only be called when absolutely necessary,
    /// such as when passing to cryptographic functions or persisting
    /// an enrollment.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Whether the secret consists only of Base32 alphabet characters
    /// (case-insensitive, trailing `=` padding allowed)
    pub fn is_canonical(&self) -> bool {
        crate::auth::base32::is_base32_alphabet(self.expose())
    }
}

impl From<String> for OtpSecret {
    fn from(secret: String) -> Self {
        Self::new(secret)
    }
}

impl From<&str> for OtpSecret {
    fn from(secret: &str) -> Self {
        Self::new(secret.to_string())
    }
}

/// Wrapper for generated TOTP codes
///
/// Generated codes are treated as sensitive data and never logged,
/// even though they have a short lifetime.
#[derive(Clone, Debug)]
pub struct TotpToken(Secret<String>);

impl TotpToken {
    /// Create a new TotpToken from a generated code string
    pub fn new(token: String) -> Self {
        Self(Secret::new(token))
    }

    /// Expose the code value (use with caution!)
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Constant-time comparison against a submitted code
    pub fn matches(&self, candidate: &str) -> bool {
        let expected = self.expose().as_bytes();
        let candidate = candidate.as_bytes();
        if expected.len() != candidate.len() {
            return false;
        }
        expected
            .iter()
            .zip(candidate)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl From<String> for TotpToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

/// Principal identifier an enrollment is keyed by
pub type PrincipalId = String;

/// Default issuer shown by authenticator apps
pub const DEFAULT_ISSUER: &str = "RL Auto Repair";

/// Fallback account label when the identity lookup has no display label
pub const FALLBACK_ACCOUNT_LABEL: &str = "user";
