//! Candidates command handler.
//!
//! Lists the uniquified names the tracker would try, in order, without
//! touching the filesystem or the registry.

use std::path::{Path, PathBuf};

use savepath_core::uniquified_candidates;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Execute the candidates command.
pub fn execute(ctx: &CliContext, path: &Path, count: u32) -> Result<(), CliError> {
    let target = ctx.resolve_target(path)?;
    for candidate in list(&target, count)? {
        println!("{}", candidate.display());
    }
    Ok(())
}

fn list(target: &Path, count: u32) -> Result<Vec<PathBuf>, CliError> {
    if target.file_name().is_none() {
        return Err(CliError::Arguments(format!(
            "{} has no file name",
            target.display()
        )));
    }
    Ok(std::iter::once(target.to_path_buf())
        .chain(uniquified_candidates(target, count))
        .collect())
}
