//! CLI configuration: thin wrapper around `espdrive_config`.
//!
//! Adds `GlobalOpts`-aware resolution: flag > env > profile > defaults.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use espdrive_core::SessionConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use espdrive_config::{Config, Profile, profile_to_session_config};

// ── Config file ─────────────────────────────────────────────────────

/// `--config` / `ESPDRIVE_CONFIG`, else the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(espdrive_config::config_path)
}

/// Load the config file, failing on a present but unreadable file.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(espdrive_config::load_config_from(&config_file(global))?)
}

pub fn load_or_default(global: &GlobalOpts) -> Config {
    load(global).unwrap_or_default()
}

pub fn save(global: &GlobalOpts, cfg: &Config) -> Result<PathBuf, CliError> {
    let path = config_file(global);
    espdrive_config::save_config_to(cfg, &path)?;
    Ok(path)
}

// ── Resolution ──────────────────────────────────────────────────────

pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    cfg.active_profile_name(global.profile.as_deref())
}

/// Fill `--output` / `--color` from `[defaults]` when not given.
pub fn apply_defaults(global: &mut GlobalOpts, cfg: &Config) {
    if global.output.is_none() {
        global.output = OutputFormat::from_str(&cfg.defaults.output, true).ok();
    }
    if global.color.is_none() {
        global.color = ColorMode::from_str(&cfg.defaults.color, true).ok();
    }
}

/// Build the session config for the active profile with flag overrides.
///
/// A profile named explicitly with `--profile` must exist; the implicit
/// default falls back to built-in values.
pub fn resolve_session_config(global: &GlobalOpts, cfg: &Config) -> Result<SessionConfig, CliError> {
    let name = active_profile_name(global, cfg);
    let mut profile = match cfg.profiles.get(&name) {
        Some(p) => p.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: available_profiles(cfg),
                name,
            });
        }
        None => Profile::default(),
    };

    if let Some(ref id) = global.device_id {
        profile.device_id.clone_from(id);
    }
    if let Some(ref url) = global.lookup_url {
        profile.lookup_url.clone_from(url);
    }
    if let Some(ref url) = global.events_url {
        profile.events_url.clone_from(url);
    }
    if let Some(ref address) = global.address {
        profile.address = Some(address.clone());
    }

    let mut session = profile_to_session_config(&profile, &cfg.defaults)?;
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        session = session.with_command_timeout(Duration::from_secs(secs));
    }
    Ok(session)
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
