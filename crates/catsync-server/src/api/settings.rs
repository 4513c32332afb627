//! Omit-fields setting handlers.

use axum::{extract::State, Extension, Json};
use catsync_core::OmitFields;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct OmitFieldsRequest {
    pub omit_fields: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SettingsData {
    omit_fields: OmitFields,
}

#[derive(Debug, Serialize)]
pub(super) struct SavedData {
    saved: bool,
    omit_fields: OmitFields,
    /// Submitted names that are not omit fields and were dropped.
    ignored: Vec<String>,
}

/// GET /api/v1/settings
pub(super) async fn get_settings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SettingsData>>, ApiError> {
    let omit_fields = state
        .sync
        .settings()
        .load_omit_fields()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(SettingsData { omit_fields }, req_id.0))
}

/// PUT /api/v1/settings/omit-fields: replace the omit-fields setting.
///
/// Unknown names are dropped with a warning rather than rejected.
pub(super) async fn put_omit_fields(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<OmitFieldsRequest>,
) -> Result<Json<ApiResponse<SavedData>>, ApiError> {
    let (omit_fields, ignored) = OmitFields::parse_lenient(&body.omit_fields);
    if !ignored.is_empty() {
        state
            .sync
            .sink()
            .warning(format!("Ignoring unknown omit fields: {}", ignored.join(", ")))
            .await;
    }

    state
        .sync
        .settings()
        .save_omit_fields(omit_fields)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    state
        .sync
        .sink()
        .info(format!("Omit fields saved: [{}]", omit_fields.names().join(", ")))
        .await;

    Ok(ApiResponse::new(
        SavedData {
            saved: true,
            omit_fields,
            ignored,
        },
        req_id.0,
    ))
}
