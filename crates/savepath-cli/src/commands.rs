//! Main commands enum and subcommand arguments.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use savepath_core::ConflictPolicy;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Reserve targets for one or more concurrent downloads of the same file
    Reserve(ReserveArgs),

    /// Show the uniquified names that would be tried for a path
    Candidates {
        /// File path or name
        path: PathBuf,
        /// How many candidates to list
        #[arg(short = 'n', long, default_value_t = 5)]
        count: u32,
    },

    /// Resolve a duplicate-download prompt for a file
    Prompt(PromptArgs),

    /// Show effective reservation settings
    Config,
}

/// Arguments for `savepath prompt`.
#[derive(Args, Debug)]
pub struct PromptArgs {
    /// File path, or a name inside the download directory
    pub path: PathBuf,

    /// What the user answers
    #[arg(long, value_enum, default_value_t = Decision::Accept)]
    pub decision: Decision,

    /// URL the download was fetched from (repeat for each redirect hop)
    #[arg(long = "url")]
    pub url_chain: Vec<String>,

    /// Response MIME type
    #[arg(long)]
    pub mime_type: Option<String>,

    /// Response content length in bytes
    #[arg(long)]
    pub size: Option<i64>,

    /// Page that started the download
    #[arg(long)]
    pub referrer: Option<String>,

    /// Treat the download as off the record
    #[arg(long)]
    pub incognito: bool,
}

/// Arguments for `savepath reserve`.
#[derive(Args, Debug, Clone)]
pub struct ReserveArgs {
    /// File path, or a name inside the download directory
    pub path: PathBuf,

    /// What to do when the target is taken
    #[arg(long, value_enum, default_value_t = PolicyArg::Uniquify)]
    pub policy: PolicyArg,

    /// Create the target directory if it is missing
    #[arg(long)]
    pub create_dir: bool,

    /// Number of concurrent downloads requesting the same path
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: u32,

    /// Create empty files at the reserved paths
    #[arg(long)]
    pub touch: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Conflict policy as spelled on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Uniquify,
    Overwrite,
    Fail,
}

impl From<PolicyArg> for ConflictPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Uniquify => Self::Uniquify,
            PolicyArg::Overwrite => Self::Overwrite,
            PolicyArg::Fail => Self::Fail,
        }
    }
}

/// Answer given to a duplicate-download prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Decision {
    /// Download again under a new name
    Accept,
    /// Do not download
    Cancel,
    /// Close the prompt without answering
    Dismiss,
}
