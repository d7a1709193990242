//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for reserving download targets.
///
/// Global options configure the reservation service; subcommands act on it.
#[derive(Parser)]
#[command(name = "savepath")]
#[command(about = "Reserve collision-free download targets")]
#[command(version)]
pub struct Cli {
    /// Override the download directory for this invocation
    #[arg(long = "download-dir", global = true)]
    pub download_dir: Option<PathBuf>,

    /// Give up after this many uniquified names
    #[arg(long = "max-attempts", global = true, env = "SAVEPATH_MAX_UNIQUIFY_ATTEMPTS")]
    pub max_attempts: Option<u32>,

    /// Maximum concurrent filesystem probes
    #[arg(long = "probe-workers", global = true, env = "SAVEPATH_MAX_PROBE_WORKERS")]
    pub probe_workers: Option<u32>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
