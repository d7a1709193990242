//! Prompt command handler.
//!
//! Opens a duplicate-download prompt for a file, answers it the way the
//! user asked and prints where the download would continue.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, TryRecvError};

use savepath_core::{DownloadInfo, ResponseMetadata};
use savepath_reserve::DownloadRecord;

use crate::bootstrap::CliContext;
use crate::commands::{Decision, PromptArgs};
use crate::error::CliError;

/// Execute the prompt command.
pub async fn execute(ctx: &mut CliContext, args: &PromptArgs) -> Result<(), CliError> {
    let info = DownloadInfo::from_response(&ResponseMetadata {
        url_chain: args.url_chain.clone(),
        mime_type: args.mime_type.clone(),
        content_length: args.size,
        referrer: args.referrer.clone(),
        ..ResponseMetadata::default()
    });
    tracing::debug!(url = %info.url, mime = %info.original_mime_type, "Prompting for download");

    let record = DownloadRecord::from_info(&info, args.incognito);
    let selected = resolve(ctx, &args.path, record, args.decision).await?;
    match selected {
        Some(path) => println!("Continuing download as {}", path.display()),
        None => println!("Download not continued"),
    }

    for (reason, count) in ctx.service.cancel_counts().iter() {
        tracing::info!(reason = %reason, count, "Cancellation recorded");
    }
    Ok(())
}

/// Answer a duplicate prompt and wait for the path it resolves to.
pub async fn resolve(
    ctx: &mut CliContext,
    path: &Path,
    record: DownloadRecord,
    decision: Decision,
) -> Result<Option<PathBuf>, CliError> {
    let target = ctx.resolve_target(path)?;
    let id = ctx.service.register_download(DownloadRecord {
        target_path: Some(target.clone()),
        ..record
    });

    let (tx, rx) = mpsc::channel();
    let mut prompt = ctx
        .service
        .create_duplicate_prompt(
            id,
            &target,
            Box::new(move |selected| {
                let _ = tx.send(selected);
            }),
        )
        .ok_or_else(|| CliError::Core("download disappeared before the prompt opened".into()))?;

    println!("{}", prompt.message_text());
    if prompt.total_bytes() > 0 {
        println!("{} bytes, {}", prompt.total_bytes(), prompt.mime_type());
    }
    match decision {
        Decision::Accept => {
            prompt.accept();
        }
        Decision::Cancel => {
            prompt.cancel();
        }
        Decision::Dismiss => prompt.on_dismissed(),
    }

    loop {
        match rx.try_recv() {
            Ok(selected) => return Ok(selected),
            Err(TryRecvError::Disconnected) => return Ok(None),
            Err(TryRecvError::Empty) => ctx.origin.run_next().await,
        }
    }
}
