//! Base32 (RFC 4648) decoding for TOTP secrets
//!
//! Two decoders are provided:
//! 1. `decode_base32` is lenient: characters outside the alphabet are
//!    skipped and a trailing partial byte is discarded. This is what every
//!    secret issued by the portal has always been decoded with.
//! 2. `decode_base32_strict` rejects anything outside the alphabet, for
//!    deployments that accept secrets typed in by hand.

use crate::error::OtpError;
use data_encoding::{Encoding, Specification};

/// RFC 4648 Base32 alphabet
pub const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Look up the 5-bit value of an alphabet character (case-insensitive)
fn symbol_value(c: char) -> Option<u8> {
    let upper = c.to_ascii_uppercase();
    ALPHABET
        .iter()
        .position(|&s| s as char == upper)
        .map(|v| v as u8)
}

/// Strip trailing `=` padding
fn strip_padding(input: &str) -> &str {
    input.trim_end_matches('=')
}

/// Decode a Base32 string, skipping unrecognized characters
///
/// Never fails. Bits are accumulated five at a time and flushed as whole
/// bytes; leftover bits (fewer than eight) are dropped.
pub fn decode_base32(input: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for value in strip_padding(input).chars().filter_map(symbol_value) {
        buffer = (buffer << 5) | u32::from(value);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    out
}

/// Strict decoding profile: uppercase alphabet, lowercase translated,
/// non-zero trailing bits tolerated
fn strict_encoding() -> Result<Encoding, OtpError> {
    let mut spec = Specification::new();
    spec.symbols.push_str(std::str::from_utf8(ALPHABET).map_err(|_| OtpError::InvalidBase32)?);
    spec.translate.from.push_str("abcdefghijklmnopqrstuvwxyz");
    spec.translate.to.push_str("ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    spec.check_trailing_bits = false;
    spec.encoding().map_err(|_| OtpError::InvalidBase32)
}

/// Number of leading symbols that carry whole bytes
///
/// `data-encoding` only accepts lengths that end on a byte boundary; any
/// symbols past that point hold only bits the lenient decoder drops too.
fn whole_byte_symbols(symbols: usize) -> usize {
    let bytes = symbols * 5 / 8;
    (bytes * 8 + 4) / 5
}

/// Decode a Base32 string, rejecting any character outside the alphabet
///
/// Accepts every input `is_base32_alphabet` accepts and yields the same
/// bytes as `decode_base32` for it.
pub fn decode_base32_strict(input: &str) -> Result<Vec<u8>, OtpError> {
    if !is_base32_alphabet(input) {
        return Err(OtpError::InvalidBase32);
    }

    let symbols = strip_padding(input);
    let whole = &symbols[..whole_byte_symbols(symbols.len())];
    strict_encoding()?
        .decode(whole.as_bytes())
        .map_err(|_| OtpError::InvalidBase32)
}

/// Check that a string only uses the Base32 alphabet (any case),
/// optionally followed by `=` padding
pub fn is_base32_alphabet(input: &str) -> bool {
    let stripped = strip_padding(input);
    !stripped.is_empty() && stripped.chars().all(|c| symbol_value(c).is_some())
}
