//! Pipeline command handlers: fetch, import, refresh.

use std::time::Duration;

use catsync_core::{BatchReport, RecordOutcome};
use catsync_sync::SyncContext;

pub(crate) async fn run_fetch(ctx: &SyncContext) -> anyhow::Result<()> {
    let summary = catsync_sync::fetch_all_products(ctx).await?;
    let total = ctx.cache().count().await?;
    println!(
        "fetch complete: {} inserted, {} updated, {total} cached",
        summary.inserted, summary.updated
    );
    Ok(())
}

/// Import one batch at `offset`, or every batch from `offset` on when `all`
/// is set.
///
/// Per-record failures are printed and do not change the exit status.
pub(crate) async fn run_import(
    ctx: &SyncContext,
    offset: u64,
    all: bool,
    delay_ms: u64,
) -> anyhow::Result<()> {
    if !all {
        let report = catsync_sync::import_batch(ctx, offset).await?;
        print_batch(&report);
        if !report.is_complete {
            println!(
                "more products remain; continue with --offset {}",
                report.next_offset
            );
        }
        return Ok(());
    }

    let totals =
        catsync_sync::import_all(ctx, offset, Duration::from_millis(delay_ms), print_batch)
            .await?;
    println!(
        "import complete: {} batches, {} imported, {} updated, {} failed",
        totals.batches, totals.imported, totals.updated, totals.failed
    );
    Ok(())
}

fn print_batch(report: &BatchReport) {
    let processed = report.next_offset.min(report.total_products);
    println!(
        "batch: {} imported, {} updated, {} errors ({processed}/{} processed)",
        report.imported,
        report.updated,
        report.errors.len(),
        report.total_products
    );
    for error in &report.errors {
        println!("  {error}");
    }
}

pub(crate) async fn run_refresh(ctx: &SyncContext, external_id: &str) -> anyhow::Result<()> {
    match catsync_sync::refresh_product(ctx, external_id).await? {
        RecordOutcome::Reconciled {
            external_id,
            action,
        } => {
            println!("{external_id}: {action:?}");
            Ok(())
        }
        RecordOutcome::Failed {
            external_id,
            reason,
        } => anyhow::bail!("refresh of {external_id} failed: {reason}"),
    }
}
