// ── Core error types ──
//
// User-facing errors from espdrive-core. Consumers never see reqwest
// errors or JSON parse failures directly; the `From<espdrive_api::Error>`
// impl folds transport failures into domain variants.

use thiserror::Error;

use crate::model::{FetchFailure, LookupFailure};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connectivity ─────────────────────────────────────────────────
    #[error("Device lookup failed: {0}")]
    Lookup(#[from] LookupFailure),

    // ── Events ───────────────────────────────────────────────────────
    #[error("Event history unavailable: {reason}")]
    EventsUnavailable { reason: FetchFailure },

    // ── Input validation ─────────────────────────────────────────────
    #[error("Unknown command '{input}' (expected adelante, atras, izquierda, derecha or stop)")]
    InvalidCommand { input: String },

    #[error("Invalid device address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<espdrive_api::Error> for CoreError {
    fn from(err: espdrive_api::Error) -> Self {
        match err {
            espdrive_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            espdrive_api::Error::Client(msg) => CoreError::Internal(msg),
            other => CoreError::EventsUnavailable {
                reason: FetchFailure::from(&other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_errors_become_fetch_failures() {
        let err: CoreError = espdrive_api::Error::HttpStatus {
            status: 503,
            body: String::new(),
        }
        .into();
        assert!(matches!(
            err,
            CoreError::EventsUnavailable {
                reason: FetchFailure::Server(503)
            }
        ));

        let err: CoreError = espdrive_api::Error::Timeout { timeout_ms: 10 }.into();
        assert!(matches!(
            err,
            CoreError::EventsUnavailable {
                reason: FetchFailure::Timeout
            }
        ));
    }
}
