//! Authentication module
//!
//! Handles Base32 secrets, HMAC-SHA1 signing, TOTP generation/verification
//! and secret provisioning.

pub mod base32;
pub mod hmac;
pub mod provisioning;
pub mod totp;
