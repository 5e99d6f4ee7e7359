//! Recipe endpoints.

use axum::{
    Json, Router,
    extract::{OriginalUri, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::Query;
use foodgram_common::AppResult;
use foodgram_core::{
    CreateRecipeInput, RecipeQuery, RecipeView, SHOPPING_LIST_FILENAME, UpdateRecipeInput,
};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{self, PageQuery, Paginated},
};

/// Recipe list query. `tags` may repeat.
#[derive(Debug, Default, Deserialize)]
pub struct ListRecipesQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: Option<String>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

impl ListRecipesQuery {
    fn filters(&self) -> RecipeQuery {
        RecipeQuery {
            tags: self.tags.clone(),
            author: self.author.clone(),
            is_favorited: is_set(self.is_favorited.as_deref()),
            is_in_shopping_cart: is_set(self.is_in_shopping_cart.as_deref()),
        }
    }
}

fn is_set(flag: Option<&str>) -> bool {
    matches!(flag, Some("1" | "true"))
}

/// Short link response.
#[derive(Serialize)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

/// List recipes.
async fn list(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ListRecipesQuery>,
) -> AppResult<Paginated<RecipeView>> {
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .resolve(state.page_size());

    let listing = state
        .recipe_service
        .list(query.filters(), page, viewer.id())
        .await?;

    Ok(Paginated::new(listing, page, &state.config.server.url, &uri))
}

/// Create a recipe.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateRecipeInput>,
) -> AppResult<Response> {
    let recipe = state.recipe_service.create(&user, input).await?;
    Ok(response::created(recipe))
}

/// Get a recipe.
async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<RecipeView>> {
    Ok(Json(state.recipe_service.get(&id, viewer.id()).await?))
}

/// Update a recipe.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateRecipeInput>,
) -> AppResult<Json<RecipeView>> {
    Ok(Json(state.recipe_service.update(&user, &id, input).await?))
}

/// Delete a recipe.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.recipe_service.delete(&user, &id).await?;
    Ok(response::ok())
}

/// Get a recipe's short link.
async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ShortLinkResponse>> {
    let short_link = state.recipe_service.short_link(&id).await?;
    Ok(Json(ShortLinkResponse { short_link }))
}

/// Add a recipe to favorites.
async fn favorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let recipe = state.favorite_service.add(&user.id, &id).await?;
    Ok(response::created(recipe))
}

/// Remove a recipe from favorites.
async fn unfavorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.favorite_service.remove(&user.id, &id).await?;
    Ok(response::ok())
}

/// Add a recipe to the shopping cart.
async fn add_to_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let recipe = state.shopping_cart_service.add(&user.id, &id).await?;
    Ok(response::created(recipe))
}

/// Remove a recipe from the shopping cart.
async fn remove_from_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.shopping_cart_service.remove(&user.id, &id).await?;
    Ok(response::ok())
}

/// Download the aggregated shopping list as a text attachment.
async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let body = state.shopping_list_service.render_for(&user.id).await?;
    let disposition = format!("attachment; filename=\"{SHOPPING_LIST_FILENAME}\"");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/download_shopping_cart", get(download_shopping_cart))
        .route("/{id}", get(show).patch(update).delete(delete))
        .route("/{id}/get-link", get(get_link))
        .route("/{id}/favorite", post(favorite).delete(unfavorite))
        .route(
            "/{id}/shopping_cart",
            post(add_to_cart).delete(remove_from_cart),
        )
}
