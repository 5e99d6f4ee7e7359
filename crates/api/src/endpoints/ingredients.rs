//! Ingredient endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use foodgram_common::AppResult;
use foodgram_core::IngredientView;
use serde::Deserialize;

use crate::middleware::AppState;

/// Ingredient search query.
#[derive(Debug, Deserialize)]
pub struct ListIngredientsQuery {
    /// Case-insensitive name prefix.
    pub name: Option<String>,
}

/// List ingredients.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListIngredientsQuery>,
) -> AppResult<Json<Vec<IngredientView>>> {
    let ingredients = state
        .ingredient_service
        .list(query.name.as_deref())
        .await?;

    Ok(Json(ingredients))
}

/// Get an ingredient.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<IngredientView>> {
    Ok(Json(state.ingredient_service.get(&id).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(show))
}
