use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use catalog_core::document::Category;
use catalog_core::store::CategoryFilter;

use super::form::UploadForm;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/categories", get(list_categories).post(create_category))
        .route(
            "/v1/categories/{id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
}

/// `GET /v1/categories?root=..&sub=..[&type=..]`
async fn list_categories(
    State(state): State<AppState>,
    Query(filter): Query<CategoryFilter>,
) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.service().list_categories(&filter).await?))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.service().get_category(&id).await?))
}

async fn create_category(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let form = UploadForm::from_multipart(multipart).await?;
    let category = state
        .service()
        .add_category(form.into_new_category())
        .await?;
    tracing::info!(id = %category.id, name = %category.name, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<Category>> {
    let form = UploadForm::from_multipart(multipart).await?;
    let category = state
        .service()
        .update_category(&id, form.into_category_update())
        .await?;
    Ok(Json(category))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let removed = state.service().delete_category(&id).await?;
    tracing::info!(
        id = %removed.id,
        variations = removed.variations.len(),
        "category deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
