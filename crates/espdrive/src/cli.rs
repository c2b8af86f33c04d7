//! Clap derive structures for the `espdrive` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Only
//! depends on clap so the build script can render man pages from it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// espdrive -- drive an ESP32 vehicle from the command line
#[derive(Debug, Parser)]
#[command(
    name = "espdrive",
    version,
    about = "Remote control for ESP32 vehicles and actuators",
    long_about = "Resolves the device's local address through the lookup service,\n\
        sends movement commands over plain HTTP, and browses the command\n\
        history kept by the events service.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device profile to use
    #[arg(long, short = 'p', env = "ESPDRIVE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file path
    #[arg(long, env = "ESPDRIVE_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Device identifier known to the lookup service (overrides profile)
    #[arg(long, short = 'd', env = "ESPDRIVE_DEVICE_ID", global = true)]
    pub device_id: Option<String>,

    /// Lookup service URL (overrides profile)
    #[arg(long, env = "ESPDRIVE_LOOKUP_URL", global = true, value_name = "URL")]
    pub lookup_url: Option<String>,

    /// Events service URL (overrides profile)
    #[arg(long, env = "ESPDRIVE_EVENTS_URL", global = true, value_name = "URL")]
    pub events_url: Option<String>,

    /// Fixed device address (host[:port]); skips the lookup
    #[arg(long, short = 'a', env = "ESPDRIVE_ADDRESS", global = true, value_name = "HOST[:PORT]")]
    pub address: Option<String>,

    /// Device command timeout in seconds
    #[arg(long, env = "ESPDRIVE_TIMEOUT", global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "ESPDRIVE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

impl GlobalOpts {
    pub fn output_format(&self) -> OutputFormat {
        self.output.unwrap_or(OutputFormat::Table)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve the device address and show the connection status
    #[command(alias = "st")]
    Status,

    /// Send one or more movement commands, in order
    #[command(
        after_help = "Commands: adelante (forward), atras (backward), izquierda (left), \
                      derecha (right), stop"
    )]
    Send(SendArgs),

    /// Browse the command history
    #[command(alias = "ev")]
    Events(EventsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SEND
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Commands to send (wire token or English name)
    #[arg(required = true, num_args = 1.., value_name = "COMMAND")]
    pub commands: Vec<String>,

    /// Keep sending after a failed command
    #[arg(long)]
    pub keep_going: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EVENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EventsCommand {
    /// List events, oldest first as reported by the server
    #[command(alias = "ls")]
    List(EventFilterArgs),

    /// Group events by day, newest day first
    Grouped(EventFilterArgs),

    /// List the days that have events
    Days(EventFilterArgs),
}

/// Shared filtering arguments for event views.
#[derive(Debug, Args)]
pub struct EventFilterArgs {
    /// Only this command (wire token or English name), or "all"
    #[arg(long, short = 'c', value_name = "COMMAND")]
    pub command: Option<String>,

    /// Date range
    #[arg(long, short = 'r', default_value = "none", conflicts_with = "on")]
    pub range: RangeArg,

    /// Only this calendar day (YYYY-MM-DD, local time)
    #[arg(long, value_name = "DATE")]
    pub on: Option<String>,

    /// Show at most this many events
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RangeArg {
    /// No date restriction
    #[value(alias = "all")]
    None,
    Today,
    Yesterday,
    /// The last 7 days
    LastWeek,
    /// The last 30 days
    LastMonth,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup
    Init,

    /// Display the current configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a configuration value on the active profile
    Set {
        /// Config key (e.g. "device_id", "address", "defaults.output")
        key: String,

        /// Value to set (empty clears optional keys)
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
