//! Config subcommand handlers.

use dialoguer::{Confirm, Input};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display as TOML-ish text.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "command_timeout = {}", cfg.defaults.command_timeout);
    let _ = writeln!(out, "events_timeout = {}", cfg.defaults.events_timeout);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "device_id = \"{}\"", p.device_id);
        let _ = writeln!(out, "lookup_url = \"{}\"", p.lookup_url);
        let _ = writeln!(out, "events_url = \"{}\"", p.events_url);
        if let Some(ref address) = p.address {
            let _ = writeln!(out, "address = \"{address}\"");
        }
        if let Some(secs) = p.command_timeout {
            let _ = writeln!(out, "command_timeout = {secs}");
        }
        if let Some(secs) = p.events_timeout {
            let _ = writeln!(out, "events_timeout = {secs}");
        }
    }

    out.trim_end().to_owned()
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt(label: &str, default: &str) -> Result<String, CliError> {
    Input::new()
        .with_prompt(label)
        .default(default.to_owned())
        .interact_text()
        .map_err(prompt_err)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => init(global),

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let out = output::render_single(global.output_format(), &cfg, format_config, |_| {
                config::config_file(global).display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_file(global).display());
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load(global)?;
            let profile_name = config::active_profile_name(global, &cfg);
            cfg.set(&profile_name, &key, &value)?;
            config::save(global, &cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load(global)?;
            let default = cfg.active_profile_name(None);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: espdrive config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if *name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load(global)?;
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save(global, &cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_file(global);
    eprintln!("espdrive configuration wizard");
    eprintln!("   Config path: {}\n", path.display());

    let mut cfg = config::load_or_default(global);
    let defaults = Profile::default();

    let profile_name = prompt("Profile name", "default")?;
    let existing = cfg.profiles.get(&profile_name).cloned().unwrap_or(defaults);

    let device_id = prompt("Device id", &existing.device_id)?;
    let lookup_url = prompt("Lookup service URL", &existing.lookup_url)?;
    let events_url = prompt("Events service URL", &existing.events_url)?;

    let address = if Confirm::new()
        .with_prompt("Use a fixed device address instead of the lookup?")
        .default(existing.address.is_some())
        .interact()
        .map_err(prompt_err)?
    {
        prompt("Device address (host[:port])", existing.address.as_deref().unwrap_or(""))?
    } else {
        String::new()
    };

    // Route through `set` so the wizard applies the same validation.
    for (key, value) in [
        ("device_id", device_id.as_str()),
        ("lookup_url", lookup_url.as_str()),
        ("events_url", events_url.as_str()),
        ("address", address.as_str()),
    ] {
        cfg.set(&profile_name, key, value)?;
    }
    cfg.default_profile = Some(profile_name.clone());

    let written = config::save(global, &cfg)?;
    eprintln!("\n✓ Configuration written to {}", written.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: espdrive status");
    Ok(())
}
