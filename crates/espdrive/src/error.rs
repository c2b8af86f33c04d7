//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with actionable
//! help text and a stable process exit code.

use miette::Diagnostic;
use thiserror::Error;

use espdrive_config::{ConfigError, SETTABLE_KEYS};
use espdrive_core::{CoreError, DispatchFailure, FetchFailure, LookupFailure};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const REJECTED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connectivity ─────────────────────────────────────────────────
    #[error("Could not resolve the device address: {reason}")]
    #[diagnostic(code(espdrive::lookup_failed), help("{help}"))]
    LookupFailed { reason: LookupFailure, help: String },

    #[error("Command '{command}' failed: {reason}")]
    #[diagnostic(code(espdrive::command_failed), help("{help}"))]
    CommandFailed {
        command: String,
        reason: DispatchFailure,
        help: String,
    },

    // ── Events ───────────────────────────────────────────────────────
    #[error("Event history unavailable: {reason}")]
    #[diagnostic(code(espdrive::events_unavailable), help("{help}"))]
    EventsUnavailable { reason: FetchFailure, help: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Unknown command '{input}'")]
    #[diagnostic(
        code(espdrive::invalid_command),
        help(
            "Valid commands: adelante (forward), atras (backward), izquierda (left), \
             derecha (right), stop"
        )
    )]
    InvalidCommand { input: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(espdrive::validation))]
    Validation { field: String, reason: String },

    #[error("Unknown config key '{key}'")]
    #[diagnostic(code(espdrive::unknown_key), help("Valid keys: {valid}"))]
    UnknownKey { key: String, valid: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(espdrive::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: espdrive config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(espdrive::config),
        help("Check the file printed by: espdrive config path")
    )]
    Config(Box<ConfigError>),

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Output rendering failed: {0}")]
    #[diagnostic(code(espdrive::render))]
    Render(String),

    #[error("{0}")]
    #[diagnostic(code(espdrive::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::LookupFailed { reason, .. } => match reason {
                LookupFailure::Timeout => exit_code::TIMEOUT,
                _ => exit_code::CONNECTION,
            },
            Self::CommandFailed { reason, .. } => match reason {
                DispatchFailure::NetworkError => exit_code::CONNECTION,
                DispatchFailure::Timeout => exit_code::TIMEOUT,
                DispatchFailure::HttpStatus(_) => exit_code::REJECTED,
                DispatchFailure::Unknown => exit_code::GENERAL,
            },
            Self::EventsUnavailable { reason, .. } => match reason {
                FetchFailure::Network => exit_code::CONNECTION,
                FetchFailure::Timeout => exit_code::TIMEOUT,
                FetchFailure::NotFound => exit_code::NOT_FOUND,
                FetchFailure::Server(_) | FetchFailure::HttpStatus(_) => exit_code::GENERAL,
            },
            Self::InvalidCommand { .. } | Self::Validation { .. } | Self::UnknownKey { .. } => {
                exit_code::USAGE
            }
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            _ => exit_code::GENERAL,
        }
    }

    pub fn lookup(reason: LookupFailure) -> Self {
        let help = match &reason {
            LookupFailure::Rejected { .. } => {
                "The lookup service does not know this device. Check --device-id or the \
                 profile's device_id."
            }
            LookupFailure::MissingAddress | LookupFailure::InvalidAddress { .. } => {
                "The device has not reported a usable local IP yet. Power-cycle it, or pass \
                 --address to skip the lookup."
            }
            LookupFailure::HttpStatus { .. } | LookupFailure::MalformedBody => {
                "The lookup service answered unexpectedly. Check lookup_url in your profile."
            }
            LookupFailure::Timeout | LookupFailure::Network { .. } => {
                "Check your internet connection, or pass --address to skip the lookup."
            }
        };
        Self::LookupFailed {
            reason,
            help: help.into(),
        }
    }

    pub fn command(command: &str, reason: DispatchFailure) -> Self {
        let help = match reason {
            DispatchFailure::NetworkError => {
                "The device is unreachable. Make sure you are on the same network as the ESP32."
            }
            DispatchFailure::Timeout => {
                "The device did not answer in time. Raise --timeout or move closer to the device."
            }
            DispatchFailure::HttpStatus(_) => {
                "The device refused the command. Check its firmware accepts this token."
            }
            DispatchFailure::Unknown => "Run with -vv for details.",
        };
        Self::CommandFailed {
            command: command.into(),
            reason,
            help: help.into(),
        }
    }

    pub fn events(reason: FetchFailure) -> Self {
        let help = match reason {
            FetchFailure::Network => "Network error. Check your internet connection.",
            FetchFailure::Timeout => "The events service did not answer in time.",
            FetchFailure::NotFound => "Service not found. Check events_url in your profile.",
            FetchFailure::Server(_) | FetchFailure::HttpStatus(_) => {
                "Server error. Try again later."
            }
        };
        Self::EventsUnavailable {
            reason,
            help: help.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Lookup(reason) => CliError::lookup(reason),
            CoreError::EventsUnavailable { reason } => CliError::events(reason),
            CoreError::InvalidCommand { input } => CliError::InvalidCommand { input },
            CoreError::InvalidAddress { input, reason } => CliError::Validation {
                field: "address".into(),
                reason: format!("'{input}': {reason}"),
            },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownKey { key } => CliError::UnknownKey {
                key,
                valid: SETTABLE_KEYS.join(", "),
            },
            other => CliError::Config(Box::new(other)),
        }
    }
}
