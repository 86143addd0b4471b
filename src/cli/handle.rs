//! Handle command implementation
//!
//! Reads one JSON action request per line from stdin and writes one JSON
//! response per line to stdout: `{"status": 200, "body": {...}}`.

use crate::cli::{open_service, CliClock};
use shopauth_core::config::TotpConfig;
use shopauth_core::error::ShopAuthError;
use shopauth_core::service::dispatch;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Run the handle command until stdin is exhausted
pub fn run_handle(config: &TotpConfig, ephemeral: bool) -> Result<bool, ShopAuthError> {
    let service = open_service(config, CliClock::from_flag(None), ephemeral)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut all_ok = true;

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = dispatch::handle_json(&service, &line);
        debug!(status = response.status, "Handled request");
        all_ok &= response.is_success();

        serde_json::to_writer(&mut stdout, &response)?;
        writeln!(stdout)?;
        stdout.flush()?;
    }

    Ok(all_ok)
}
