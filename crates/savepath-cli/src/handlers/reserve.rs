//! Reserve command handler.
//!
//! Registers `count` downloads that all want the same path, submits their
//! reservations at once and prints what each one got. Reservations live only
//! as long as the process; `--touch` materializes them as empty files so a
//! later run sees them on disk.

use std::fs::OpenOptions;
use std::sync::mpsc;

use serde_json::json;

use savepath_core::{ReservationRequest, ReservationResult};
use savepath_reserve::DownloadRecord;

use crate::bootstrap::CliContext;
use crate::commands::ReserveArgs;
use crate::error::CliError;

/// Execute the reserve command.
pub async fn execute(ctx: &mut CliContext, args: &ReserveArgs) -> Result<(), CliError> {
    let results = reserve_all(ctx, args).await?;

    let mut failures = 0usize;
    let mut rendered = Vec::with_capacity(results.len());
    for result in &results {
        match result {
            Ok(reserved) => {
                if args.touch {
                    OpenOptions::new()
                        .write(true)
                        .create_new(true)
                        .open(reserved.path())?;
                }
                if !args.json {
                    println!("{}", reserved.path().display());
                }
                rendered.push(json!({ "path": reserved.path(), "owner": reserved.owner }));
            }
            Err(err) => {
                failures += 1;
                if !args.json {
                    eprintln!("{}", err.user_message());
                }
                rendered.push(json!({ "error": err }));
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    }

    if failures > 0 {
        return Err(CliError::Reservation(format!(
            "{failures} of {} reservations failed",
            results.len()
        )));
    }
    Ok(())
}

/// Submit every reservation, then drive the origin until all have answered.
///
/// Results come back in submission order.
pub async fn reserve_all(
    ctx: &mut CliContext,
    args: &ReserveArgs,
) -> Result<Vec<ReservationResult>, CliError> {
    if args.count == 0 {
        return Err(CliError::Arguments("count must be at least 1".to_string()));
    }

    let download_dir = ctx.download_dir()?;
    let target = ctx.resolve_target(&args.path)?;
    let (tx, rx) = mpsc::channel();

    for index in 0..args.count {
        let id = ctx.service.register_download(DownloadRecord {
            target_path: Some(target.clone()),
            ..DownloadRecord::default()
        });
        let request = ReservationRequest::new(id, target.clone(), download_dir.clone())
            .with_policy(args.policy.into())
            .with_create_directory(args.create_dir);

        let tx = tx.clone();
        ctx.service.reserve(request, move |result| {
            // The receiver outlives every submitted reservation.
            let _ = tx.send((index, result));
        });
    }
    drop(tx);

    let expected = args.count as usize;
    let mut answered = Vec::with_capacity(expected);
    while answered.len() < expected {
        ctx.origin.run_next().await;
        answered.extend(rx.try_iter());
    }

    answered.sort_by_key(|(index, _)| *index);
    Ok(answered.into_iter().map(|(_, result)| result).collect())
}
