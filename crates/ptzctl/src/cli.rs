//! Clap derive structures for the `ptzctl` CLI.
//!
//! Also compiled by `build.rs` for man page generation, so nothing here may
//! depend on anything beyond clap and clap_complete.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ptzctl -- control ONVIF PTZ cameras
#[derive(Debug, Parser)]
#[command(
    name = "ptzctl",
    version,
    about = "Control ONVIF PTZ cameras from the command line or over HTTP",
    long_about = "Connects to the PTZ cameras listed in the configuration file and\n\
        drives them through ONVIF. Commands can be sent once from the command\n\
        line or served over HTTP to control panels, stream decks and OBS docks.",
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
    /// Configuration file (default: platform config dir)
    #[arg(long, env = "PTZCTL_CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress console logging and non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
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
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Color if stdout is a terminal and NO_COLOR is unset
    Auto,
    Always,
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP control surface until interrupted
    Serve(ServeArgs),

    /// Connect to every configured camera and report its state
    #[command(alias = "ls")]
    Cameras,

    /// Send one structured command (e.g. `control move pan=0.5`)
    #[command(alias = "ctl")]
    Control(ControlArgs),

    /// Send one legacy CGI command (e.g. `cgi 'ptzcmd&left&100'`)
    Cgi(CgiArgs),

    /// Inspect the configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen port (overrides webserver.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Listen on all interfaces (overrides webserver.remote)
    #[arg(long)]
    pub remote: bool,
}

#[derive(Debug, Args)]
pub struct ControlArgs {
    /// Operation name: move, stop, home, gotoPreset, set_preset,
    /// remove_preset, focus, focusstop, get_status, get_presets,
    /// get_imaging, set_imaging
    pub operation: String,

    /// Operation parameters as KEY=VALUE
    #[arg(value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Camera id (1-based, configuration order)
    #[arg(long, short = 'c', default_value = "1")]
    pub camera: String,
}

#[derive(Debug, Args)]
pub struct CgiArgs {
    /// `&`-separated argument list, e.g. `ptzcmd&poscall&3`
    pub args: String,

    /// Camera id (1-based, configuration order)
    #[arg(long, short = 'c', default_value = "1")]
    pub camera: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the configuration file path
    Path,
    /// Print the effective configuration (passwords masked)
    Show,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
