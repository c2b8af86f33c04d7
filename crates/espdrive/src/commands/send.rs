//! `send`: dispatch movement commands in order.

use serde::Serialize;
use tabled::Tabled;

use espdrive_core::{CommandKind, CommandOutcome, DispatchFailure, Session, parse_command};

use crate::cli::{GlobalOpts, SendArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct SendResult {
    seq: usize,
    command: CommandKind,
    #[serde(flatten)]
    outcome: CommandOutcome,
}

#[derive(Tabled)]
struct SendRow {
    #[tabled(rename = "#")]
    seq: usize,
    #[tabled(rename = "Command")]
    command: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Response")]
    response: String,
}

fn to_row(r: &SendResult, color: bool) -> SendRow {
    let (ok, response) = match &r.outcome {
        CommandOutcome::Sent { body } => (true, body.trim().to_owned()),
        CommandOutcome::Failed { reason } => (false, reason.to_string()),
    };
    SendRow {
        seq: r.seq,
        command: format!("{} {}", r.command.arrow(), r.command.token()),
        result: output::paint_ok(ok, color),
        response,
    }
}

fn plain_line(r: &SendResult) -> String {
    match &r.outcome {
        CommandOutcome::Sent { body } => format!("{}\tok\t{}", r.command, body.trim()),
        CommandOutcome::Failed { reason } => format!("{}\tfailed\t{reason}", r.command),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: SendArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Validate every token before touching the network.
    let commands = args
        .commands
        .iter()
        .map(|raw| parse_command(raw))
        .collect::<Result<Vec<_>, _>>()?;

    util::connect_with_spinner(session, global)
        .await
        .map_err(CliError::lookup)?;

    let mut results = Vec::with_capacity(commands.len());
    let mut first_failure: Option<(CommandKind, DispatchFailure)> = None;

    for command in commands {
        let outcome = session.send(command).await;
        let failure = outcome.failure();
        results.push(SendResult {
            seq: results.len() + 1,
            command,
            outcome,
        });

        if let Some(reason) = failure {
            first_failure.get_or_insert((command, reason));
            if !args.keep_going {
                break;
            }
        }
    }

    let color = output::should_color(global.color_mode());
    let out = output::render_list(
        global.output_format(),
        &results,
        |r| to_row(r, color),
        plain_line,
    )?;
    output::print_output(&out, global.quiet);

    match first_failure {
        Some((command, reason)) => Err(CliError::command(command.token(), reason)),
        None => Ok(()),
    }
}
