//! CLI argument definitions
//!
//! All Clap derive structs for `tezas` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

// ============================================================================
// Root CLI
// ============================================================================

/// Headless runtime for the TEZAS site's intro and section tracking.
#[derive(Parser, Debug)]
#[command(name = "tezas", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "TEZAS_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true)]
    pub log_format: OutputFormat,

    /// Write JSONL events to this file instead of stdout.
    #[arg(long, global = true)]
    pub events_file: Option<PathBuf>,

    /// Serve Prometheus metrics on 127.0.0.1:<port>.
    #[arg(long, global = true)]
    pub metrics_port: Option<u16>,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Simulate a page visit: intro (unless already shown), then tracking.
    Visit(VisitArgs),

    /// Play the intro sequence on its own.
    Intro(IntroArgs),

    /// Replay a scroll trace against the section tracker.
    Track(TrackArgs),

    /// Validate site configuration files.
    Validate(ValidateArgs),

    /// Show the time left until the symposium.
    Countdown(CountdownArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Page Commands
// ============================================================================

/// Arguments for `visit`.
#[derive(Args, Debug)]
pub struct VisitArgs {
    /// Site configuration file.
    #[arg(short, long, env = "TEZAS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Session file shared between visits (omit for a fresh session).
    #[arg(short, long, env = "TEZAS_SESSION_FILE")]
    pub session: Option<PathBuf>,

    /// Scroll trace replayed once the main view is up.
    #[arg(short, long)]
    pub trace: Option<PathBuf>,

    /// Press skip this long after mount (e.g. "2500ms"). Overrides the trace.
    #[arg(long, value_parser = parse_offset)]
    pub skip_at: Option<Duration>,
}

/// Arguments for `intro`.
#[derive(Args, Debug)]
pub struct IntroArgs {
    /// Site configuration file.
    #[arg(short, long, env = "TEZAS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Press skip this long after start (e.g. "500ms").
    #[arg(long, value_parser = parse_offset)]
    pub skip_at: Option<Duration>,
}

/// Arguments for `track`.
#[derive(Args, Debug)]
pub struct TrackArgs {
    /// Site configuration file.
    #[arg(short, long, env = "TEZAS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Scroll trace to replay.
    #[arg(short, long)]
    pub trace: PathBuf,
}

// ============================================================================
// Validate / Countdown / Version
// ============================================================================

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `countdown`.
#[derive(Args, Debug)]
pub struct CountdownArgs {
    /// Site configuration file (for `countdown.target`).
    #[arg(short, long, env = "TEZAS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Target timestamp; overrides the config.
    #[arg(long)]
    pub target: Option<String>,

    /// Compute as of this timestamp instead of the current time.
    #[arg(long, conflicts_with = "watch")]
    pub now: Option<String>,

    /// Refresh once a second until the target passes.
    #[arg(long)]
    pub watch: bool,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Parses `--skip-at` with the same bounds as config offsets.
fn parse_offset(value: &str) -> Result<Duration, String> {
    crate::config::parse_duration("--skip-at", value).map_err(|e| e.to_string())
}

// ============================================================================
// Tests
// ============================================================================
