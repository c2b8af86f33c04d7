//! Command dispatch: bridges CLI args -> core Session -> output formatting.

pub mod config_cmd;
pub mod events;
pub mod send;
pub mod status;
pub mod util;

use espdrive_core::Session;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(session, global).await,
        Command::Send(args) => send::handle(session, args, global).await,
        Command::Events(args) => events::handle(session, args, global).await,
        // Config and Completions are handled before a session exists
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions do not take a device session".into(),
        )),
    }
}
