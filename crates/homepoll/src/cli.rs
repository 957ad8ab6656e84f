//! Clap derive structures for the `homepoll` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// homepoll -- poll and drive LAN appliances from the command line
#[derive(Debug, Parser)]
#[command(
    name = "homepoll",
    version,
    about = "Poll and control a Pi-hole and Audio Station players",
    long_about = "Reads Pi-hole blocking statistics and drives Synology Audio Station\n\
        remote players.\n\n\
        One-shot commands query a single device; `run` hosts every configured\n\
        device, polls on a schedule, and accepts channel commands on stdin.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "HOMEPOLL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Configured device to act on
    #[arg(long, short = 'd', env = "HOMEPOLL_DEVICE", global = true)]
    pub device: Option<String>,

    /// Device base URL (overrides the config entry)
    #[arg(long, short = 'u', env = "HOMEPOLL_URL", global = true)]
    pub url: Option<String>,

    /// Pi-hole API token
    #[arg(long, env = "HOMEPOLL_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Audio Station username
    #[arg(long, env = "HOMEPOLL_USERNAME", global = true)]
    pub username: Option<String>,

    /// Audio Station password
    #[arg(long, env = "HOMEPOLL_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Audio Station remote player name
    #[arg(long, env = "HOMEPOLL_PLAYER", global = true)]
    pub player: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "HOMEPOLL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Verify TLS certificates against the system store
    #[arg(long, global = true, conflicts_with = "ca_cert")]
    pub strict_tls: bool,

    /// Verify TLS certificates against this CA bundle
    #[arg(long, global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HOMEPOLL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
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

#[derive(Debug, Clone, Copy, ValueEnum)]
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
    /// Query and toggle a Pi-hole
    #[command(alias = "ph")]
    Pihole(PiholeArgs),

    /// Drive an Audio Station remote player
    #[command(alias = "as")]
    Audio(AudioArgs),

    /// Host every configured device until interrupted
    Run(RunArgs),

    /// Inspect the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Pi-hole ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PiholeArgs {
    #[command(subcommand)]
    pub command: PiholeCommand,
}

#[derive(Debug, Subcommand)]
pub enum PiholeCommand {
    /// Show blocking status and counters
    Summary {
        /// Request the formatted rendering (grouped digits)
        #[arg(long)]
        formatted: bool,
    },

    /// Turn blocking on
    Enable,

    /// Turn blocking off
    Disable {
        /// Re-enable automatically after this many seconds (0 = never)
        #[arg(long, default_value = "0")]
        seconds: u64,
    },

    /// Check whether the admin API answers
    Ping,
}

// ── Audio Station ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AudioArgs {
    #[command(subcommand)]
    pub command: AudioCommand,
}

#[derive(Debug, Subcommand)]
pub enum AudioCommand {
    /// Show playback state, volume, and current track
    Status,

    /// List remote players known to the station
    Players,

    /// Send a transport action to the player
    Control {
        #[arg(value_enum)]
        action: ControlAction,
    },

    /// Set the player volume (0-100)
    Volume {
        #[arg(value_parser = clap::value_parser!(u32).range(0..=100))]
        percent: u32,
    },

    /// Check whether the station answers
    Ping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ControlAction {
    Play,
    Pause,
    Stop,
    Next,
    Prev,
}

// ── Run ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Ignore stdin instead of reading `<device> <channel> <command>` lines
    #[arg(long)]
    pub no_stdin: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Print the effective config with secrets redacted
    Show,

    /// List configured devices
    Devices,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
