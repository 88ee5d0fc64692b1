use axum::{extract::State, routing::get, Json, Router};
use catalog_core::mutation::CatalogStats;
use catalog_core::taxonomy::Taxonomy;

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/taxonomy", get(taxonomy))
        .route("/v1/stats", get(stats))
}

async fn taxonomy(State(state): State<AppState>) -> Json<Taxonomy> {
    Json(state.service().taxonomy().clone())
}

/// Dashboard counters across every category.
async fn stats(State(state): State<AppState>) -> ApiResult<Json<CatalogStats>> {
    Ok(Json(state.service().stats().await?))
}
