//! Tag endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use foodgram_common::AppResult;
use foodgram_core::TagView;

use crate::middleware::AppState;

/// List all tags.
async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<TagView>>> {
    Ok(Json(state.tag_service.list().await?))
}

/// Get a tag.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<TagView>> {
    Ok(Json(state.tag_service.get(&id).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(show))
}
