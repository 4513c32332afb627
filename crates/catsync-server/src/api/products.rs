//! Product pipeline handlers: fetch, import batch, total, single refresh.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use catsync_core::{BatchReport, FetchSummary, RecordOutcome};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_store_error, map_sync_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Default, Deserialize)]
pub(super) struct ImportRequest {
    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Serialize)]
pub(super) struct TotalData {
    total_products: u64,
}

#[derive(Debug, Serialize)]
pub(super) struct RefreshData {
    outcome: RecordOutcome,
}

/// POST /api/v1/products/fetch: refresh the cache from the source listing.
pub(super) async fn fetch_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<FetchSummary>>, ApiError> {
    let summary = catsync_sync::fetch_all_products(&state.sync)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(summary, req_id.0))
}

/// POST /api/v1/products/import: reconcile one batch starting at `offset`.
///
/// The body may be omitted; the offset then defaults to 0.
pub(super) async fn import_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Option<Json<ImportRequest>>,
) -> Result<Json<ApiResponse<BatchReport>>, ApiError> {
    let offset = body.map(|Json(b)| b.offset).unwrap_or_default();
    let report = catsync_sync::import_batch(&state.sync, offset)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(report, req_id.0))
}

/// GET /api/v1/products/total: number of cached records.
pub(super) async fn total_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<TotalData>>, ApiError> {
    let total_products = state
        .sync
        .cache()
        .count()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(TotalData { total_products }, req_id.0))
}

/// POST /api/v1/products/{external_id}/refresh: re-fetch and reconcile one record.
pub(super) async fn refresh_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(external_id): Path<String>,
) -> Result<Json<ApiResponse<RefreshData>>, ApiError> {
    let external_id = external_id.trim();
    if external_id.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "external_id must not be empty",
        ));
    }

    let outcome = catsync_sync::refresh_product(&state.sync, external_id)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(RefreshData { outcome }, req_id.0))
}
