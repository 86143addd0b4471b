//! Time sources for TOTP computation
//!
//! Code generation and verification read "now" through the `Clock` trait so
//! that tests (and the CLI `--at` flag) can pin an exact time step.

use crate::error::OtpError;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current Unix time in seconds
pub trait Clock {
    fn unix_seconds(&self) -> Result<u64, OtpError>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> Result<u64, OtpError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|_| OtpError::TimeError)
    }
}

/// A clock frozen at a given Unix time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn unix_seconds(&self) -> Result<u64, OtpError> {
        Ok(self.0)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn unix_seconds(&self) -> Result<u64, OtpError> {
        (**self).unix_seconds()
    }
}
