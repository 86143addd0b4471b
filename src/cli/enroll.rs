//! Enroll command implementation
//!
//! Interactive enrollment: issue a secret, let the user add it to an
//! authenticator app, then confirm with a code before anything is saved.

use crate::cli::ops::with_label;
use crate::cli::{open_service, CliClock};
use colored::Colorize;
use shopauth_core::config::TotpConfig;
use shopauth_core::error::ShopAuthError;
use shopauth_core::service::EnrollmentState;
use std::io::{self, Write};

/// Codes the user may try before the candidate secret is thrown away
const MAX_ATTEMPTS: usize = 3;

/// Run the enroll command
pub fn run_enroll(
    config: &TotpConfig,
    user: &str,
    label: Option<&str>,
) -> Result<bool, ShopAuthError> {
    let config = with_label(config, user, label);
    let service = open_service(&config, CliClock::from_flag(None), false)?;

    println!("🔐 Two-Factor Authentication Setup");
    println!("==================================");
    println!();

    if service.check(user)?.state == EnrollmentState::Enabled {
        println!("⚠️  {} already has two-factor authentication enabled.", user.bold());
        if !prompt_yes_no("Replace the existing authenticator?", false)? {
            println!("Enrollment cancelled.");
            return Ok(false);
        }
        println!();
    }

    let provisioning = service.generate(user)?;

    println!("Scan this URI as a QR code in your authenticator app:");
    println!();
    println!("  {}", provisioning.otpauth_uri);
    println!();
    println!("Or enter this key manually:");
    println!();
    println!("  {}", provisioning.secret.expose().bold());
    println!();

    for attempt in 1..=MAX_ATTEMPTS {
        let token = prompt_input("Enter the 6-digit code from your app: ")?;
        if token.is_empty() {
            println!("❌ Code cannot be empty.");
            continue;
        }

        if service.confirm(user, provisioning.secret.expose(), &token)? {
            println!();
            println!("{} Two-factor authentication enabled for {}", "✅".green(), user.bold());
            return Ok(true);
        }

        let left = MAX_ATTEMPTS - attempt;
        if left > 0 {
            println!("❌ Invalid code. Please try again ({} left).", left);
        }
    }

    println!("{}", "Enrollment failed: no valid code entered. Nothing was saved.".red());
    Ok(false)
}

/// Prompt for yes/no with default
fn prompt_yes_no(prompt: &str, default_yes: bool) -> Result<bool, ShopAuthError> {
    let default_indicator = if default_yes { "[Y/n]" } else { "[y/N]" };
    let prompt_text = format!("{} {}: ", prompt, default_indicator);

    loop {
        let input = prompt_input(&prompt_text)?.to_lowercase();

        match input.as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            "" => return Ok(default_yes),
            _ => println!("Please enter 'y' for yes or 'n' for no."),
        }
    }
}

/// Low-level input prompting
fn prompt_input(prompt: &str) -> Result<String, ShopAuthError> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into());
    }

    Ok(input.trim().to_string())
}
