//! Single-record refresh: re-read one product from the source, store it,
//! and reconcile it immediately.

use catsync_core::RecordOutcome;
use catsync_source::normalize_product;

use crate::context::SyncContext;
use crate::error::SyncError;
use crate::import::import_record;

/// Fetch `external_id` from the source, upsert it into the cache, and
/// reconcile it with the current omit-fields setting.
///
/// A reconciliation failure is returned as [`RecordOutcome::Failed`], the
/// same way a batch reports it.
///
/// # Errors
///
/// Returns [`SyncError::CommerceNotConfigured`] when no commerce site is
/// attached, [`SyncError::Source`] when the product cannot be fetched or is
/// malformed, or [`SyncError::Store`] when the cache write or settings read
/// fails.
pub async fn refresh_product(
    ctx: &SyncContext,
    external_id: &str,
) -> Result<RecordOutcome, SyncError> {
    ctx.commerce()?;
    let sink = ctx.sink();
    sink.info(format!("Requesting single product from source: {external_id}"))
        .await;

    let record = match ctx
        .source()
        .fetch_product(external_id)
        .await
        .and_then(normalize_product)
    {
        Ok(record) => record,
        Err(e) => {
            sink.error(format!("Source API request for product {external_id} failed: {e}"))
                .await;
            return Err(e.into());
        }
    };

    if let Err(e) = ctx.cache().upsert(&record).await {
        sink.error(format!("Error storing product {}: {e}", record.external_id))
            .await;
        return Err(e.into());
    }

    let omit = ctx.settings().load_omit_fields().await?;
    Ok(import_record(ctx, &record, omit).await)
}
