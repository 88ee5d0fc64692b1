use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/ping", get(ping))
}

/// Full health check. Verifies database connectivity when Postgres backs the store.
async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let database = match state.pool() {
        Some(pool) => {
            sqlx::query("SELECT 1").execute(pool).await?;
            "connected"
        }
        None => "memory",
    };

    Ok(Json(json!({
        "status": "ok",
        "database": database,
        "subscribers": state.event_bus().subscriber_count(),
    })))
}

/// Lightweight ping, no backend checks.
async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
