//! Full refresh of the cache from the source listing.

use catsync_core::FetchSummary;
use catsync_source::client::MAX_PAGES;
use catsync_source::{normalize_product, SourceError, SourcePage};

use crate::context::SyncContext;
use crate::error::SyncError;

/// Walk every listing page and upsert its records into the cache.
///
/// Pages are requested from 1 up to the `total_pages` reported by the most
/// recent page. Counters are summed across pages.
///
/// A transport failure, non-2xx status, or malformed page payload aborts the
/// run and is returned; rows already stored stay stored. A single record that
/// fails to decode or to store is logged and skipped without being counted.
///
/// # Errors
///
/// Returns [`SyncError::Source`] for page-level failures, including
/// [`SourceError::PaginationLimit`] when the server reports more than
/// [`MAX_PAGES`] pages.
pub async fn fetch_all_products(ctx: &SyncContext) -> Result<FetchSummary, SyncError> {
    let sink = ctx.sink();
    sink.info("Starting product fetch").await;

    let mut summary = FetchSummary::default();
    let mut page: u32 = 1;
    let mut total_pages: u32 = 1;

    while page <= total_pages {
        if page > MAX_PAGES {
            let err = SourceError::PaginationLimit {
                max_pages: MAX_PAGES,
            };
            sink.error(format!("Aborting fetch: {err} (server reported {total_pages} pages)"))
                .await;
            return Err(err.into());
        }

        sink.info(format!("Requesting products page {page}")).await;
        let fetched = match ctx.source().fetch_page(page, ctx.page_size()).await {
            Ok(fetched) => fetched,
            Err(e) => {
                sink.error(format!("Source API request for page {page} failed: {e}"))
                    .await;
                return Err(e.into());
            }
        };

        total_pages = fetched.total_pages;
        store_page(ctx, &fetched, &mut summary).await;
        page += 1;
    }

    sink.info(format!(
        "Fetch complete: {} inserted, {} updated",
        summary.inserted, summary.updated
    ))
    .await;
    Ok(summary)
}

async fn store_page(ctx: &SyncContext, page: &SourcePage, summary: &mut FetchSummary) {
    let sink = ctx.sink();

    for item in page.products() {
        let record = match item.and_then(normalize_product) {
            Ok(record) => record,
            Err(e) => {
                sink.error(format!("Skipping product on page {}: {e}", page.page))
                    .await;
                continue;
            }
        };

        sink.debug(format!("Processing product: {}", record.external_id))
            .await;
        match ctx.cache().upsert(&record).await {
            Ok(outcome) => summary.record(outcome),
            Err(e) => {
                sink.error(format!("Error storing product {}: {e}", record.external_id))
                    .await;
            }
        }
    }
}
