//! Argument structures for CLI commands

use clap::{Args, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Arguments for the `run` command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to JSONL log file (overrides `log_path` from the configuration)
    #[arg(long)]
    pub log: Option<PathBuf>,
}

/// Arguments for the `filter` command
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Socket path to listen on
    #[arg(short, long)]
    pub listen: PathBuf,

    /// Upstream SSH agent socket path
    ///
    /// Defaults to the value of SSH_AUTH_SOCK environment variable
    #[arg(short, long, env = "SSH_AUTH_SOCK")]
    pub upstream: Option<PathBuf>,

    /// Comma-separated fingerprint patterns
    ///
    /// A key is exposed when any pattern is a substring of its
    /// `SHA256:...` or legacy MD5 fingerprint.
    #[arg(short, long, value_name = "PATTERNS")]
    pub fingerprints: String,

    /// Path to JSONL log file
    #[arg(long)]
    pub log: Option<PathBuf>,
}

/// Arguments for the `mux` command
#[derive(Args, Debug, Clone)]
pub struct MuxArgs {
    /// Socket path to listen on
    #[arg(short, long)]
    pub listen: PathBuf,

    /// Upstream SSH agent sockets, in priority order
    #[arg(required = true, value_name = "UPSTREAM")]
    pub upstreams: Vec<PathBuf>,

    /// Path to JSONL log file
    #[arg(long)]
    pub log: Option<PathBuf>,
}

/// Output format for the `config` command
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigFormat {
    #[default]
    Toml,
    Json,
}

/// Arguments for the `config` command
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Validate configuration only
    #[arg(long, conflicts_with_all = ["example", "paths"])]
    pub validate: bool,

    /// Show an example configuration
    #[arg(long, conflicts_with = "paths")]
    pub example: bool,

    /// Show configuration file search paths
    #[arg(long)]
    pub paths: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ConfigFormat::Toml)]
    pub format: ConfigFormat,
}

/// Arguments for the `completion` command
#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
