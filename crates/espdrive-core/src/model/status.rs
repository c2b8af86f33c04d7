// ── Connection state and per-call outcomes ──

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::address::DeviceAddress;

/// Tri-state connection status for the session's device.
///
/// Starts at `Connecting`. Only a fresh resolution leaves `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        })
    }
}

impl<E> From<&Result<DeviceAddress, E>> for ConnectionStatus {
    fn from(result: &Result<DeviceAddress, E>) -> Self {
        if result.is_ok() {
            Self::Connected
        } else {
            Self::Error
        }
    }
}

// ── Lookup ──────────────────────────────────────────────────────────

/// Why a lookup did not produce an address.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum LookupFailure {
    #[error("lookup service rejected the device: {}", .message.as_deref().unwrap_or("no reason given"))]
    Rejected { message: Option<String> },

    #[error("lookup response carried no ip_local")]
    MissingAddress,

    #[error("lookup returned an unusable address '{raw}'")]
    InvalidAddress { raw: String },

    #[error("lookup service answered HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("lookup service timed out")]
    Timeout,

    #[error("lookup service unreachable: {detail}")]
    Network { detail: String },

    #[error("lookup response was not valid JSON")]
    MalformedBody,
}

impl From<espdrive_api::Error> for LookupFailure {
    fn from(err: espdrive_api::Error) -> Self {
        use espdrive_api::Error as Api;
        if err.is_timeout() {
            return Self::Timeout;
        }
        match err {
            Api::HttpStatus { status, .. } => Self::HttpStatus { status },
            Api::Deserialization { .. } | Api::Body(_) => Self::MalformedBody,
            other => Self::Network {
                detail: other.to_string(),
            },
        }
    }
}

// ── Dispatch ────────────────────────────────────────────────────────

/// Classification of a failed command dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchFailure {
    /// DNS failure, connection refused, reset, and the like.
    #[error("device unreachable")]
    NetworkError,
    #[error("device did not answer in time")]
    Timeout,
    #[error("device rejected the command (HTTP {0})")]
    HttpStatus(u16),
    /// No address, or a failure that fits no other class.
    #[error("command could not be sent")]
    Unknown,
}

/// Result of exactly one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Sent { body: String },
    Failed { reason: DispatchFailure },
}

impl CommandOutcome {
    pub fn sent(body: impl Into<String>) -> Self {
        Self::Sent { body: body.into() }
    }

    pub fn failed(reason: DispatchFailure) -> Self {
        Self::Failed { reason }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }

    pub fn failure(&self) -> Option<DispatchFailure> {
        match self {
            Self::Sent { .. } => None,
            Self::Failed { reason } => Some(*reason),
        }
    }
}

// ── Events fetch ────────────────────────────────────────────────────

/// Why the events service could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFailure {
    #[error("network error")]
    Network,
    #[error("request timed out")]
    Timeout,
    #[error("service not found")]
    NotFound,
    #[error("server error (HTTP {0})")]
    Server(u16),
    #[error("unexpected HTTP {0}")]
    HttpStatus(u16),
}

impl From<&espdrive_api::Error> for FetchFailure {
    fn from(err: &espdrive_api::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        match err.status() {
            Some(404) => Self::NotFound,
            Some(code) if code >= 500 => Self::Server(code),
            Some(code) => Self::HttpStatus(code),
            None => Self::Network,
        }
    }
}
