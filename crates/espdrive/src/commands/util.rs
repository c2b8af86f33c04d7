//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use espdrive_core::{DeviceAddress, LookupFailure, Session};

use crate::cli::GlobalOpts;

/// Resolve the device address behind a spinner on interactive terminals.
pub async fn connect_with_spinner(
    session: &Session,
    global: &GlobalOpts,
) -> Result<DeviceAddress, LookupFailure> {
    let spinner = (!global.quiet && std::io::stderr().is_terminal()).then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Resolving {}...", session.config().device_id));
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    });

    let result = session.connect().await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    result
}
