//! Batch import of cached records into the commerce catalog.
//!
//! Each call handles one window of the cache and reports where the next
//! call should start. The caller drives the loop; see [`import_all`] for the
//! in-process version.

use std::time::Duration;

use catsync_core::{BatchReport, CachedProduct, OmitFields, RecordOutcome};
use serde::Serialize;

use crate::context::SyncContext;
use crate::error::SyncError;
use crate::reconcile::reconcile_record;

/// Totals over every batch of an [`import_all`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportTotals {
    pub batches: u64,
    pub imported: u64,
    pub updated: u64,
    pub failed: u64,
}

/// Reconcile the cached records in `[offset, offset + batch_size)`.
///
/// Records are read in cache insertion order. A record that fails is logged
/// and reported in `errors`; the rest of the batch still runs.
///
/// # Errors
///
/// Returns [`SyncError::CommerceNotConfigured`] when no commerce site is
/// attached, or [`SyncError::Store`] when the settings or the batch cannot
/// be read.
pub async fn import_batch(ctx: &SyncContext, offset: u64) -> Result<BatchReport, SyncError> {
    ctx.commerce()?;
    let sink = ctx.sink();
    sink.info(format!("Starting product import from offset {offset}"))
        .await;

    let omit = ctx.settings().load_omit_fields().await?;
    let batch_size = u64::from(ctx.batch_size());
    let records = ctx.cache().list_batch(offset, batch_size).await?;
    let total = ctx.cache().count().await?;

    let mut report = BatchReport::new(offset, batch_size, total);
    for record in &records {
        let outcome = import_record(ctx, record, omit).await;
        report.record(&outcome);
    }

    sink.info(format!(
        "Import batch at offset {offset} finished: {} imported, {} updated, {} errors",
        report.imported,
        report.updated,
        report.errors.len()
    ))
    .await;
    Ok(report)
}

/// Reconcile one record, capturing any failure as [`RecordOutcome::Failed`].
pub(crate) async fn import_record(
    ctx: &SyncContext,
    record: &CachedProduct,
    omit: OmitFields,
) -> RecordOutcome {
    match reconcile_record(ctx, record, omit).await {
        Ok(action) => RecordOutcome::Reconciled {
            external_id: record.external_id.clone(),
            action,
        },
        Err(e) => {
            ctx.sink()
                .error(format!(
                    "Error importing product {}: {e}",
                    record.external_id
                ))
                .await;
            RecordOutcome::Failed {
                external_id: record.external_id.clone(),
                reason: e.to_string(),
            }
        }
    }
}

/// Run [`import_batch`] from `start_offset` until the cache is exhausted,
/// sleeping `delay` between batches. `on_batch` sees every report as it
/// completes.
///
/// # Errors
///
/// Stops at the first batch-level error; see [`import_batch`].
pub async fn import_all<F>(
    ctx: &SyncContext,
    start_offset: u64,
    delay: Duration,
    mut on_batch: F,
) -> Result<ImportTotals, SyncError>
where
    F: FnMut(&BatchReport),
{
    let mut totals = ImportTotals::default();
    let mut offset = start_offset;

    loop {
        let report = import_batch(ctx, offset).await?;
        on_batch(&report);

        totals.batches += 1;
        totals.imported += report.imported;
        totals.updated += report.updated;
        totals.failed += report.errors.len() as u64;

        if report.is_complete {
            break;
        }
        offset = report.next_offset;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    Ok(totals)
}
