//! Short link redirects, served outside `/api`.

use axum::{
    Router,
    extract::{Path, State},
    response::Redirect,
    routing::get,
};
use foodgram_common::AppResult;

use crate::middleware::AppState;

/// Redirect a short code to its recipe page.
async fn resolve(State(state): State<AppState>, Path(code): Path<String>) -> AppResult<Redirect> {
    let recipe_id = state.recipe_service.resolve_short_code(&code).await?;
    Ok(Redirect::to(&format!("/recipes/{recipe_id}")))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/s/{code}", get(resolve))
}
