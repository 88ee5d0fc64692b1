use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Serves the in-memory blob store. Only mounted when that backend is active.
pub fn routes() -> Router<AppState> {
    Router::new().route("/blobs/{key}", get(get_blob))
}

/// `key` is the storage path, percent-encoded into a single segment.
async fn get_blob(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let blobs = state
        .memory_blobs()
        .ok_or_else(|| ApiError::NotFound("blob storage is external".into()))?;
    let not_found = || ApiError::NotFound(format!("blob `{key}` not found"));

    let bytes = blobs.bytes(&key).await.ok_or_else(not_found)?;
    let content_type = blobs
        .content_type(&key)
        .await
        .unwrap_or_else(|| "application/octet-stream".to_string());
    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}
