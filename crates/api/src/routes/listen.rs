use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use catalog_core::store::CategoryFilter;
use tokio_stream::{Stream, StreamExt};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/listen", get(listen))
}

/// Stream full snapshots for one taxonomy key as Server-Sent Events.
/// The subscription is dropped with the stream when the client disconnects.
async fn listen(
    State(state): State<AppState>,
    Query(filter): Query<CategoryFilter>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    tracing::info!(key = %filter.key(), "listener connected");
    let subscription = state.service().subscribe(filter).await?;
    let events = subscription.map(|snapshot| Event::default().event("snapshot").json_data(snapshot));

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
