//! Operator log viewer.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use catsync_sync::LogEntry;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct LogQuery {
    pub limit: Option<i64>,
}

pub(super) fn normalize_limit(limit: Option<i64>) -> usize {
    usize::try_from(limit.unwrap_or(50).clamp(1, 500)).unwrap_or(50)
}

/// GET /api/v1/log?limit=N: most recent sink entries, newest first.
pub(super) async fn recent_log(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LogQuery>,
) -> Result<Json<ApiResponse<Vec<LogEntry>>>, ApiError> {
    let entries = state
        .sync
        .sink()
        .recent(normalize_limit(query.limit))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to read log sink");
            ApiError::new(req_id.0.clone(), "internal_error", "failed to read log")
        })?;
    Ok(ApiResponse::new(entries, req_id.0))
}
