//! One-shot commands mapping directly onto the enrollment operations

use crate::cli::{open_service, CliClock};
use colored::Colorize;
use shopauth_core::config::TotpConfig;
use shopauth_core::error::ShopAuthError;

/// Apply a `--label` override on top of the configured accounts
pub fn with_label(config: &TotpConfig, user: &str, label: Option<&str>) -> TotpConfig {
    let mut config = config.clone();
    if let Some(label) = label {
        config.accounts.insert(user.to_string(), label.to_string());
    }
    config
}

/// `shopauth generate`: print a candidate secret and its provisioning URI
///
/// Nothing is stored; run `setup` (or `enroll`) to confirm it.
pub fn run_generate(
    config: &TotpConfig,
    user: &str,
    label: Option<&str>,
) -> Result<bool, ShopAuthError> {
    let config = with_label(config, user, label);
    let service = open_service(&config, CliClock::from_flag(None), false)?;
    let provisioning = service.generate(user)?;

    println!("secret: {}", provisioning.secret.expose());
    println!("uri:    {}", provisioning.otpauth_uri);
    Ok(true)
}

/// `shopauth verify`: check a token against a secret
pub fn run_verify(
    config: &TotpConfig,
    secret: Option<&str>,
    token: Option<&str>,
    at: Option<u64>,
) -> Result<bool, ShopAuthError> {
    let service = open_service(config, CliClock::from_flag(at), true)?;
    let valid = service.verify(secret, token)?;

    if valid {
        println!("{}", "valid".green());
    } else {
        println!("{}", "invalid".red());
    }
    Ok(valid)
}

/// `shopauth setup`: persist a secret as the user's enabled enrollment
///
/// With `--token`, the token is verified first and nothing is written if it
/// does not match.
pub fn run_setup(
    config: &TotpConfig,
    user: &str,
    secret: &str,
    token: Option<&str>,
    at: Option<u64>,
) -> Result<bool, ShopAuthError> {
    let service = open_service(config, CliClock::from_flag(at), false)?;

    match token {
        Some(token) => {
            if !service.confirm(user, secret, token)? {
                eprintln!("{}", "Invalid code, enrollment not saved.".red());
                return Ok(false);
            }
        }
        None => service.setup(user, secret)?,
    }

    println!("{} TOTP enabled for {}", "✓".green(), user.bold());
    Ok(true)
}

/// `shopauth check`: report enrollment state
pub fn run_check(config: &TotpConfig, user: &str, show_secret: bool) -> Result<bool, ShopAuthError> {
    let service = open_service(config, CliClock::from_flag(None), false)?;
    let status = service.check(user)?;

    let state = status.state.to_string();
    let state = if status.has_totp() {
        state.green()
    } else {
        state.yellow()
    };
    println!("{}: {}", user.bold(), state);

    if show_secret {
        if let Some(secret) = &status.secret {
            println!("secret: {}", secret.expose());
        }
    }
    Ok(status.has_totp())
}

/// `shopauth disable`: switch off an enrollment
pub fn run_disable(config: &TotpConfig, user: &str) -> Result<bool, ShopAuthError> {
    let service = open_service(config, CliClock::from_flag(None), false)?;

    if service.disable(user)? {
        println!("TOTP disabled for {}", user.bold());
        Ok(true)
    } else {
        eprintln!("No TOTP enrollment for {}", user);
        Ok(false)
    }
}
