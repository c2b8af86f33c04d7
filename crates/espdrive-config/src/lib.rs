//! Shared configuration for the espdrive CLI.
//!
//! TOML profiles, figment loading (defaults, file, `ESPDRIVE_` env), and
//! translation to `espdrive_core::SessionConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use espdrive_core::config::{DEFAULT_DEVICE_ID, DEFAULT_EVENTS_URL, DEFAULT_LOOKUP_URL};
use espdrive_core::{DeviceAddress, SessionConfig};

/// Env var that points at an alternate config file.
pub const CONFIG_PATH_ENV: &str = "ESPDRIVE_CONFIG";

const ENV_PREFIX: &str = "ESPDRIVE_";
const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown config key '{key}'")]
    UnknownKey { key: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is given on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::from([(DEFAULT_PROFILE.to_owned(), Profile::default())]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Device command timeout, seconds.
    #[serde(default = "default_command_timeout")]
    pub command_timeout: u64,

    /// Events and lookup timeout, seconds.
    #[serde(default = "default_events_timeout")]
    pub events_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            command_timeout: default_command_timeout(),
            events_timeout: default_events_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_command_timeout() -> u64 {
    5
}
fn default_events_timeout() -> u64 {
    10
}

/// A named device profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Identifier the lookup service knows the device by.
    #[serde(default = "default_device_id")]
    pub device_id: String,

    #[serde(default = "default_lookup_url")]
    pub lookup_url: String,

    #[serde(default = "default_events_url")]
    pub events_url: String,

    /// Fixed device address (`host[:port]`). Skips the lookup when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Override `defaults.command_timeout`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_timeout: Option<u64>,

    /// Override `defaults.events_timeout`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_timeout: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            device_id: default_device_id(),
            lookup_url: default_lookup_url(),
            events_url: default_events_url(),
            address: None,
            command_timeout: None,
            events_timeout: None,
        }
    }
}

fn default_device_id() -> String {
    DEFAULT_DEVICE_ID.into()
}
fn default_lookup_url() -> String {
    DEFAULT_LOOKUP_URL.into()
}
fn default_events_url() -> String {
    DEFAULT_EVENTS_URL.into()
}

/// Keys accepted by [`Config::set`].
pub const SETTABLE_KEYS: &[&str] = &[
    "device_id",
    "lookup_url",
    "events_url",
    "address",
    "command_timeout",
    "events_timeout",
    "defaults.output",
    "defaults.color",
    "defaults.command_timeout",
    "defaults.events_timeout",
    "default_profile",
];

impl Config {
    /// Name of the profile to use: `explicit`, else `default_profile`,
    /// else "default".
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE.into())
    }

    /// Set one key. Profile keys apply to `profile`, creating it if needed.
    /// An empty value clears optional profile keys.
    pub fn set(&mut self, profile: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "default_profile" => self.default_profile = Some(value.to_owned()),
            "defaults.output" => self.defaults.output = value.to_owned(),
            "defaults.color" => self.defaults.color = value.to_owned(),
            "defaults.command_timeout" => {
                self.defaults.command_timeout = parse_secs(key, value)?;
            }
            "defaults.events_timeout" => self.defaults.events_timeout = parse_secs(key, value)?,
            _ => {
                let entry = self.profiles.entry(profile.to_owned()).or_default();
                entry.set(key, value)?;
            }
        }
        Ok(())
    }
}

impl Profile {
    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let optional = |v: &str| (!v.trim().is_empty()).then(|| v.trim().to_owned());
        match key {
            "device_id" => {
                if value.trim().is_empty() {
                    return Err(invalid(key, "must not be empty"));
                }
                self.device_id = value.trim().to_owned();
            }
            "lookup_url" => {
                parse_url(key, value)?;
                self.lookup_url = value.trim().to_owned();
            }
            "events_url" => {
                parse_url(key, value)?;
                self.events_url = value.trim().to_owned();
            }
            "address" => {
                if let Some(raw) = optional(value) {
                    parse_address(&raw)?;
                    self.address = Some(raw);
                } else {
                    self.address = None;
                }
            }
            "command_timeout" => {
                self.command_timeout = optional(value).map(|v| parse_secs(key, &v)).transpose()?;
            }
            "events_timeout" => {
                self.events_timeout = optional(value).map(|v| parse_secs(key, &v)).transpose()?;
            }
            other => return Err(ConfigError::UnknownKey { key: other.into() }),
        }
        Ok(())
    }
}

fn parse_secs(field: &str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(invalid(field, "timeout must be at least 1 second")),
        Ok(secs) => Ok(secs),
        Err(_) => Err(invalid(field, format!("expected whole seconds, got '{value}'"))),
    }
}

fn parse_url(field: &str, value: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = value
        .trim()
        .parse()
        .map_err(|_| invalid(field, format!("invalid URL: {value}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(field, format!("expected an http(s) URL, got '{value}'")));
    }
    Ok(url)
}

fn parse_address(value: &str) -> Result<DeviceAddress, ConfigError> {
    value.parse().map_err(|e: espdrive_core::CoreError| invalid("address", e.to_string()))
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `ESPDRIVE_CONFIG`, else platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "espdrive", "espdrive").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("espdrive");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from `path`, then `ESPDRIVE_` env with `__` as the nesting
/// separator (e.g. `ESPDRIVE_DEFAULTS__OUTPUT=json`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `SessionConfig` from a profile and the global defaults.
///
/// Validates both URLs and the optional address override.
pub fn profile_to_session_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    if profile.device_id.trim().is_empty() {
        return Err(invalid("device_id", "must not be empty"));
    }
    let lookup_url = parse_url("lookup_url", &profile.lookup_url)?;
    let events_url = parse_url("events_url", &profile.events_url)?;

    let command_secs = profile.command_timeout.unwrap_or(defaults.command_timeout);
    let events_secs = profile.events_timeout.unwrap_or(defaults.events_timeout);

    let mut config = SessionConfig::new(profile.device_id.trim(), lookup_url, events_url)
        .with_command_timeout(Duration::from_secs(command_secs.max(1)))
        .with_events_timeout(Duration::from_secs(events_secs.max(1)))
        .with_lookup_timeout(Duration::from_secs(events_secs.max(1)));

    if let Some(raw) = profile.address.as_deref().filter(|a| !a.trim().is_empty()) {
        config = config.with_address_override(parse_address(raw)?);
    }

    Ok(config)
}
