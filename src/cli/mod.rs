//! CLI module for authsock-mux
//!
//! This module provides the command-line interface using clap derive macros.

pub mod args;
pub mod commands;
pub mod exit_code;

pub use exit_code::ExitCode;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use args::{CompletionArgs, ConfigArgs, FilterArgs, MuxArgs, RunArgs};

/// SSH agent proxy that filters and multiplexes upstream agents
#[derive(Parser, Debug)]
#[command(name = "authsock-mux")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, global = true, env = "AUTHSOCK_MUX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve every socket defined in the configuration file
    Run(RunArgs),

    /// Serve one socket exposing only keys matching fingerprints
    Filter(FilterArgs),

    /// Serve one socket combining several upstream agents
    Mux(MuxArgs),

    /// Show or validate configuration
    Config(ConfigArgs),

    /// Show version information (use --verbose for build details)
    Version,

    /// Generate shell completions
    Completion(CompletionArgs),
}
