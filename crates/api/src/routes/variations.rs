use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{patch, post},
    Json, Router,
};
use catalog_core::document::id::is_variation_id;
use catalog_core::document::Variation;

use super::form::UploadForm;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/categories/{id}/variations", post(add_variation))
        .route(
            "/v1/categories/{id}/variations/{variation_id}",
            patch(update_variation).delete(delete_variation),
        )
}

async fn add_variation(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Variation>)> {
    let form = UploadForm::from_multipart(multipart).await?;
    let variation = state
        .service()
        .add_variation(&category_id, form.into_new_variation())
        .await?;
    Ok((StatusCode::CREATED, Json(variation)))
}

async fn update_variation(
    State(state): State<AppState>,
    Path((category_id, variation_id)): Path<(String, String)>,
    multipart: Multipart,
) -> ApiResult<Json<Variation>> {
    require_variation_id(&variation_id)?;
    let form = UploadForm::from_multipart(multipart).await?;
    let variation = state
        .service()
        .update_variation(&category_id, &variation_id, form.into_variation_update())
        .await?;
    Ok(Json(variation))
}

async fn delete_variation(
    State(state): State<AppState>,
    Path((category_id, variation_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    require_variation_id(&variation_id)?;
    state
        .service()
        .delete_variation_by_id(&category_id, &variation_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ids that could never have been generated cannot name a stored variation.
fn require_variation_id(variation_id: &str) -> ApiResult<()> {
    if is_variation_id(variation_id) {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!(
            "`{variation_id}` is not a variation id"
        )))
    }
}
