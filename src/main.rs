//! shopauth - TOTP two-factor CLI for the RL Auto Repair portal
//!
//! Issues, confirms, checks and verifies time-based one-time-password
//! enrollments, and serves the portal's JSON action requests over stdio.

use clap::{Args, Parser, Subcommand};
use shopauth_core::error::{OtpError, RequestError, ShopAuthError};
use shopauth_core::init_logging;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "shopauth")]
#[command(about = "TOTP two-factor enrollment and verification for the shop portal")]
struct Cli {
    /// Configuration file (defaults to ~/.config/shopauth/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct UserArg {
    /// Principal (user) id
    #[arg(long)]
    user: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a candidate secret and provisioning URI (not saved)
    Generate {
        #[command(flatten)]
        user: UserArg,
        /// Account label shown in the authenticator app
        #[arg(long)]
        label: Option<String>,
    },
    /// Check a code against a secret (±1 time step)
    Verify {
        #[arg(long)]
        secret: Option<String>,
        #[arg(long)]
        token: Option<String>,
        /// Evaluate at this Unix time instead of now
        #[arg(long)]
        at: Option<u64>,
    },
    /// Save a secret as the user's enabled enrollment
    Setup {
        #[command(flatten)]
        user: UserArg,
        #[arg(long)]
        secret: String,
        /// Require this code to verify before saving
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        at: Option<u64>,
    },
    /// Show whether the user has two-factor enabled
    Check {
        #[command(flatten)]
        user: UserArg,
        /// Also print the enrolled secret
        #[arg(long)]
        show_secret: bool,
    },
    /// Disable the user's enrollment
    Disable {
        #[command(flatten)]
        user: UserArg,
    },
    /// Interactive enrollment: generate, scan, confirm
    Enroll {
        #[command(flatten)]
        user: UserArg,
        #[arg(long)]
        label: Option<String>,
    },
    /// Print the current code for a secret or an enrolled user
    Code {
        #[arg(long, conflicts_with = "user", required_unless_present = "user")]
        secret: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        at: Option<u64>,
    },
    /// Answer JSON action requests read line by line from stdin
    Handle {
        /// Keep enrollments in memory only
        #[arg(long)]
        ephemeral: bool,
    },
}

fn run(cli: Cli) -> Result<bool, ShopAuthError> {
    let config = cli::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate { user, label } => {
            cli::ops::run_generate(&config, &user.user, label.as_deref())
        }
        Commands::Verify { secret, token, at } => {
            cli::ops::run_verify(&config, secret.as_deref(), token.as_deref(), at)
        }
        Commands::Setup {
            user,
            secret,
            token,
            at,
        } => cli::ops::run_setup(&config, &user.user, &secret, token.as_deref(), at),
        Commands::Check { user, show_secret } => {
            cli::ops::run_check(&config, &user.user, show_secret)
        }
        Commands::Disable { user } => cli::ops::run_disable(&config, &user.user),
        Commands::Enroll { user, label } => {
            cli::enroll::run_enroll(&config, &user.user, label.as_deref())
        }
        Commands::Code { secret, user, at } => {
            let source = match (secret.as_deref(), user.as_deref()) {
                (Some(secret), _) => cli::code::CodeSource::Secret(secret),
                (None, Some(user)) => cli::code::CodeSource::User(user),
                (None, None) => {
                    return Err(RequestError::MissingField {
                        field: "secret or user".to_string(),
                    }
                    .into())
                }
            };
            cli::code::run_code(&config, source, at)
        }
        Commands::Handle { ephemeral } => cli::handle::run_handle(&config, ephemeral),
    }
}

/// Map an error to the process exit code
///
/// Configuration and usage errors exit with 2, runtime failures with 1.
fn exit_code(err: &ShopAuthError) -> i32 {
    match err {
        ShopAuthError::Otp(OtpError::TimeError) => 1,
        ShopAuthError::Config(_)
        | ShopAuthError::Toml(_)
        | ShopAuthError::Request(_)
        | ShopAuthError::Otp(_) => 2,
        ShopAuthError::Store(_) | ShopAuthError::Io(_) | ShopAuthError::Json(_) => 1,
    }
}

fn main() {
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(exit_code(&e));
        }
    }
}
