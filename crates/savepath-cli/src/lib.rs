//! `savepath` command-line adapter.
//!
//! - `parser` / `commands` - clap definitions
//! - `bootstrap` - composition root
//! - `handlers` - one module per subcommand
//! - `error` - exit-code mapping

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;

// Used by the binary only
use anyhow as _;
use dotenvy as _;
use tokio as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, LogEmitter, bootstrap};
pub use commands::{Commands, Decision, PolicyArg, PromptArgs, ReserveArgs};
pub use error::CliError;
pub use logging::init_tracing;
pub use parser::Cli;
