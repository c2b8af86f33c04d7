// ── Command dispatch ──

use espdrive_api::{DeviceClient, Error as ApiError};
use tracing::{debug, warn};

use crate::model::{CommandKind, CommandOutcome, DeviceAddress, DispatchFailure};

/// Sends one command to the device and classifies what happened.
///
/// Stateless: no queue, no retry, no lock around the request. Callers that
/// need ordering await each `send` before issuing the next.
pub struct CommandDispatcher {
    client: DeviceClient,
}

impl CommandDispatcher {
    pub fn new(client: DeviceClient) -> Self {
        Self { client }
    }

    /// `POST http://{address}/comando` with the command's wire token.
    ///
    /// Without an address this returns `Failed(Unknown)` and makes no
    /// request.
    pub async fn send(&self, address: Option<&DeviceAddress>, command: CommandKind) -> CommandOutcome {
        let Some(address) = address else {
            warn!(%command, "no device address, command not sent");
            return CommandOutcome::failed(DispatchFailure::Unknown);
        };

        let url = match address.command_url() {
            Ok(url) => url,
            Err(e) => {
                warn!(%command, error = %e, "could not build command URL");
                return CommandOutcome::failed(DispatchFailure::Unknown);
            }
        };

        let outcome = match self.client.post_command(url, command.token()).await {
            Ok(body) => CommandOutcome::sent(body),
            Err(e) => CommandOutcome::failed(classify(&e)),
        };

        match &outcome {
            CommandOutcome::Sent { body } => debug!(%command, %address, body = %body, "command sent"),
            CommandOutcome::Failed { reason } => warn!(%command, %address, %reason, "command failed"),
        }
        outcome
    }
}

fn classify(err: &ApiError) -> DispatchFailure {
    if err.is_timeout() {
        return DispatchFailure::Timeout;
    }
    match err {
        ApiError::HttpStatus { status, .. } => DispatchFailure::HttpStatus(*status),
        ApiError::Transport(_) => DispatchFailure::NetworkError,
        _ => DispatchFailure::Unknown,
    }
}
