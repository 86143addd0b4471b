//! Core library for the shopauth two-factor tool
//!
//! This crate provides TOTP (RFC 6238) generation and verification, secret
//! provisioning, and the enrollment service behind the shop portal's
//! second login factor.

pub mod error;
pub mod types;

pub mod auth;
pub mod clock;
pub mod config;
pub mod identity;
pub mod service;
pub mod store;

/// Initialize logging infrastructure
///
/// Sets up tracing with systemd journal logging when running under systemd.
/// Otherwise logs to stderr, so stdout stays reserved for command output.
pub fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    #[cfg(target_os = "linux")]
    {
        if std::env::var("JOURNAL_STREAM").is_ok() {
            let journal_layer = tracing_journald::layer()?;
            tracing_subscriber::registry()
                .with(journal_layer)
                .with(tracing_subscriber::filter::LevelFilter::INFO)
                .init();
            return Ok(());
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::filter::LevelFilter::WARN)
        .init();

    Ok(())
}
