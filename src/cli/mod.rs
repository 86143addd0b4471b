//! CLI command implementations
//!
//! This module contains the implementation of all CLI subcommands and the
//! wiring that turns configuration into a `TotpService`.

use shopauth_core::clock::{Clock, FixedClock, SystemClock};
use shopauth_core::config::{toml_config, TotpConfig};
use shopauth_core::error::{OtpError, ShopAuthError};
use shopauth_core::identity::StaticDirectory;
use shopauth_core::service::TotpService;
use shopauth_core::store::{EnrollmentStore, FileStore, MemoryStore};
use std::path::Path;
use tracing::debug;

pub mod code;
pub mod enroll;
pub mod handle;
pub mod ops;

/// Clock selected on the command line: wall clock, or pinned by `--at`
#[derive(Debug, Clone, Copy)]
pub enum CliClock {
    System(SystemClock),
    Fixed(FixedClock),
}

impl CliClock {
    pub fn from_flag(at: Option<u64>) -> Self {
        match at {
            Some(seconds) => CliClock::Fixed(FixedClock(seconds)),
            None => CliClock::System(SystemClock),
        }
    }
}

impl Clock for CliClock {
    fn unix_seconds(&self) -> Result<u64, OtpError> {
        match self {
            CliClock::System(clock) => clock.unix_seconds(),
            CliClock::Fixed(clock) => clock.unix_seconds(),
        }
    }
}

pub type CliService = TotpService<Box<dyn EnrollmentStore>, StaticDirectory, CliClock>;

/// Load configuration from `--config`, or the default location
pub fn load_config(path: Option<&Path>) -> Result<TotpConfig, ShopAuthError> {
    match path {
        Some(path) => toml_config::load_config_from_path(path),
        None => toml_config::load_config(),
    }
}

/// Build the service backing a command
///
/// `ephemeral` swaps the enrollment file for an in-memory store.
pub fn open_service(
    config: &TotpConfig,
    clock: CliClock,
    ephemeral: bool,
) -> Result<CliService, ShopAuthError> {
    let store: Box<dyn EnrollmentStore> = if ephemeral {
        debug!("Using in-memory enrollment store");
        Box::new(MemoryStore::new())
    } else {
        let path = toml_config::resolve_store_path(config)?;
        debug!("Using enrollment file {:?}", path);
        Box::new(FileStore::new(path))
    };

    Ok(TotpService::new(
        store,
        StaticDirectory::from(&config.accounts),
        clock,
        config,
    ))
}
