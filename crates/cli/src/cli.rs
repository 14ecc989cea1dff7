//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// ScamLens - Gemini-backed scam message analysis
#[derive(Parser, Debug)]
#[command(
    name = "scamlens",
    author,
    version,
    about = "Analyze suspicious messages with a bounded Gemini worker pool",
    long_about = "Analyzes suspicious messages for scam indicators using Gemini.\n\n\
                  Model calls are mediated by a bounded worker pool with queue \n\
                  admission control, per-call timeouts, and atomic metrics."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SCAMLENS_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SCAMLENS_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a message for scam indicators
    Analyze(AnalyzeArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `analyze` command
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Message text to analyze (reads stdin when omitted and --file is unset)
    pub message: Option<String>,

    /// Read the message from a file instead of the command line
    #[arg(short, long, conflicts_with = "message")]
    pub file: Option<PathBuf>,

    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "config.toml", env = "SCAMLENS_CONFIG")]
    pub config: PathBuf,

    /// Override the model name from configuration
    #[arg(long, env = "SCAMLENS_MODEL")]
    pub model: Option<String>,

    /// Per-call timeout in seconds (0 = use configured default)
    #[arg(long, default_value = "0", env = "SCAMLENS_TIMEOUT")]
    pub timeout: f64,

    /// Use the offline mock client instead of the real API
    #[arg(long)]
    pub mock: bool,

    /// Probe the API with a connection test before analyzing
    #[arg(long)]
    pub check_connection: bool,

    /// Output the verdict as JSON
    #[arg(long)]
    pub json: bool,

    /// Print dispatcher metrics after the analysis
    #[arg(long)]
    pub metrics: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "SCAMLENS_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show safety settings
    #[arg(long)]
    pub safety: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
