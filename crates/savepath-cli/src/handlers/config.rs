//! Config command handler.
//!
//! Prints the effective reservation settings as JSON.

use serde_json::json;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Execute the config command.
pub fn execute(ctx: &CliContext) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(&render(ctx))?);
    Ok(())
}

fn render(ctx: &CliContext) -> serde_json::Value {
    let settings = ctx.service.settings();
    let download_directory = match ctx.service.default_download_dir() {
        Ok(dir) => json!(dir.display().to_string()),
        Err(e) => json!({ "error": e.to_string() }),
    };

    json!({
        "max_uniquify_attempts": settings.effective_max_uniquify_attempts(),
        "max_probe_workers": settings.effective_max_probe_workers(),
        "download_directory": download_directory,
    })
}
