//! `status`: resolve the device and report the connection state.

use serde::Serialize;

use espdrive_core::{ConnectionStatus, Session};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct StatusReport {
    device_id: String,
    status: ConnectionStatus,
    address: Option<String>,
    source: &'static str,
    error: Option<String>,
}

fn detail(report: &StatusReport, color: bool) -> String {
    let mut lines = vec![
        format!("Device:  {}", report.device_id),
        format!("Status:  {}", output::paint_status(report.status, color)),
        format!("Address: {}", report.address.as_deref().unwrap_or("-")),
        format!("Source:  {}", report.source),
    ];
    if let Some(ref error) = report.error {
        lines.push(format!("Error:   {error}"));
    }
    lines.join("\n")
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let result = util::connect_with_spinner(session, global).await;
    let color = output::should_color(global.color_mode());

    let report = StatusReport {
        device_id: session.config().device_id.clone(),
        status: session.status(),
        address: result.as_ref().ok().map(ToString::to_string),
        source: if session.config().address_override.is_some() {
            "override"
        } else {
            "lookup"
        },
        error: result.as_ref().err().map(ToString::to_string),
    };

    let out = output::render_single(
        global.output_format(),
        &report,
        |r| detail(r, color),
        |r| r.address.clone().unwrap_or_default(),
    )?;
    output::print_output(&out, global.quiet);

    result.map(|_| ()).map_err(CliError::lookup)
}
