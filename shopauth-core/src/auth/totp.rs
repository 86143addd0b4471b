//! TOTP (Time-based One-Time Password) generation and verification
//!
//! RFC 6238 on top of RFC 4226: the counter is `floor(unix / period)`, the
//! HMAC-SHA1 digest is dynamically truncated to a 31-bit integer and reduced
//! modulo `10^digits`. Verification accepts the codes for `skew` steps on
//! either side of the current one to absorb clock drift.

use crate::auth::{base32, hmac};
use crate::clock::Clock;
use crate::error::OtpError;
use crate::types::{OtpSecret, TotpToken};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// RFC 6238 default time step in seconds
pub const DEFAULT_PERIOD: u64 = 30;

/// Default code length
pub const DEFAULT_DIGITS: u32 = 6;

/// Default number of adjacent steps accepted on each side
pub const DEFAULT_SKEW: u64 = 1;

/// How a Base32 secret is turned into key bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretDecoding {
    /// Unrecognized characters are skipped
    #[default]
    Lenient,
    /// Unrecognized characters are an error
    Strict,
}

/// Parameters shared by generation and verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotpParams {
    pub period: u64,
    pub digits: u32,
    pub skew: u64,
    pub decoding: SecretDecoding,
}

impl Default for TotpParams {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            digits: DEFAULT_DIGITS,
            skew: DEFAULT_SKEW,
            decoding: SecretDecoding::Lenient,
        }
    }
}

/// Compute the time step containing `unix_seconds`
pub fn time_step(unix_seconds: u64, period: u64) -> Result<u64, OtpError> {
    if period == 0 {
        return Err(OtpError::InvalidPeriod);
    }
    Ok(unix_seconds / period)
}

/// Seconds left before the step containing `unix_seconds` rolls over
pub fn seconds_remaining(unix_seconds: u64, period: u64) -> Result<u64, OtpError> {
    if period == 0 {
        return Err(OtpError::InvalidPeriod);
    }
    Ok(period - unix_seconds % period)
}

/// RFC 4226 dynamic truncation
///
/// The low nibble of the last digest byte selects a 4-byte window; its most
/// significant bit is masked off before reduction.
pub fn truncate(digest: &[u8; hmac::DIGEST_LEN], digits: u32) -> u32 {
    let offset = (digest[hmac::DIGEST_LEN - 1] & 0x0F) as usize;
    let binary = u32::from_be_bytes([
        digest[offset] & 0x7F,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    binary % 10u32.pow(digits)
}

fn check_digits(digits: u32) -> Result<(), OtpError> {
    if (6..=8).contains(&digits) {
        Ok(())
    } else {
        Err(OtpError::InvalidDigits { digits })
    }
}

/// HOTP code for a raw key and counter, zero-padded to `digits`
pub fn hotp(key: &[u8], counter: u64, digits: u32) -> Result<TotpToken, OtpError> {
    check_digits(digits)?;
    let digest = hmac::sign_counter(key, counter);
    let code = truncate(&digest, digits);
    Ok(TotpToken::new(format!("{:0width$}", code, width = digits as usize)))
}

/// Decode a secret according to the configured decoding mode
pub fn decode_secret(secret: &OtpSecret, decoding: SecretDecoding) -> Result<Vec<u8>, OtpError> {
    match decoding {
        SecretDecoding::Lenient => Ok(base32::decode_base32(secret.expose())),
        SecretDecoding::Strict => base32::decode_base32_strict(secret.expose()),
    }
}

/// Generate the code for the step containing `unix_seconds`
pub fn generate_code_at(
    secret: &OtpSecret,
    unix_seconds: u64,
    params: &TotpParams,
) -> Result<TotpToken, OtpError> {
    let key = decode_secret(secret, params.decoding)?;
    let step = time_step(unix_seconds, params.period)?;
    hotp(&key, step, params.digits)
}

/// Generate the code for the current step of `clock`
pub fn generate_code(
    secret: &OtpSecret,
    clock: &impl Clock,
    params: &TotpParams,
) -> Result<TotpToken, OtpError> {
    generate_code_at(secret, clock.unix_seconds()?, params)
}

/// Check `token` against the steps `T - skew ..= T + skew` around `unix_seconds`
///
/// Steps that would fall before the epoch are skipped.
pub fn verify_token_at(
    secret: &OtpSecret,
    token: &str,
    unix_seconds: u64,
    params: &TotpParams,
) -> Result<bool, OtpError> {
    let key = decode_secret(secret, params.decoding)?;
    let current = time_step(unix_seconds, params.period)?;
    let first = current.saturating_sub(params.skew);
    let last = current.saturating_add(params.skew);

    let mut matched = false;
    for step in first..=last {
        // no early exit: every candidate in the window is computed
        matched |= hotp(&key, step, params.digits)?.matches(token);
    }

    debug!(
        step = current,
        window = params.skew,
        matched = matched,
        "TOTP verification"
    );
    Ok(matched)
}

/// Check `token` against the window around the current step of `clock`
pub fn verify_token(
    secret: &OtpSecret,
    token: &str,
    clock: &impl Clock,
    params: &TotpParams,
) -> Result<bool, OtpError> {
    verify_token_at(secret, token, clock.unix_seconds()?, params)
}
