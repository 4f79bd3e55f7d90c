use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{api::state::AppState, error::Result, storage::save_document};

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    filename: String,
}

/// Stores a supporting document (license or ID proof) and returns its URL.
/// Registration requires both document URLs up front, so this runs first.
pub async fn upload_document(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>)> {
    let url = save_document(state.store.as_ref(), &params.filename, &body).await?;

    Ok((StatusCode::CREATED, Json(json!({ "url": url }))))
}
