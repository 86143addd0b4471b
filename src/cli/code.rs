//! Code command implementation
//!
//! Prints the current code for a secret (or for an enrolled user) to stdout,
//! with no additional formatting, for scripting and support desks.

use crate::cli::{open_service, CliClock};
use shopauth_core::auth::totp;
use shopauth_core::clock::Clock;
use shopauth_core::config::TotpConfig;
use shopauth_core::error::{RequestError, ShopAuthError};
use shopauth_core::types::OtpSecret;

/// Where the secret comes from
pub enum CodeSource<'a> {
    Secret(&'a str),
    User(&'a str),
}

/// Run the code command
pub fn run_code(
    config: &TotpConfig,
    source: CodeSource<'_>,
    at: Option<u64>,
) -> Result<bool, ShopAuthError> {
    let clock = CliClock::from_flag(at);

    let secret = match source {
        CodeSource::Secret(secret) => OtpSecret::from(secret),
        CodeSource::User(user) => {
            let service = open_service(config, clock, false)?;
            service.check(user)?.secret.ok_or_else(|| RequestError::MissingField {
                field: format!("enabled enrollment for {}", user),
            })?
        }
    };

    let params = config.params();
    let now = clock.unix_seconds()?;
    let code = totp::generate_code_at(&secret, now, &params)?;

    println!("{}", code.expose());
    eprintln!(
        "valid for {}s",
        totp::seconds_remaining(now, params.period)?
    );
    Ok(true)
}
