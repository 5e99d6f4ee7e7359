//! User endpoints.

use axum::{
    Json, Router,
    extract::{OriginalUri, Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use foodgram_common::AppResult;
use foodgram_core::{CreateUserInput, SetPasswordInput, Subscription, UserView};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{self, PageQuery, Paginated},
};

/// Subscription list query.
#[derive(Debug, Deserialize)]
pub struct SubscriptionsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub recipes_limit: Option<u64>,
}

/// Query for subscribe.
#[derive(Debug, Deserialize)]
pub struct RecipesLimitQuery {
    pub recipes_limit: Option<u64>,
}

/// Avatar request and response.
#[derive(Debug, Deserialize, Serialize)]
pub struct AvatarBody {
    pub avatar: Option<String>,
}

/// List users.
async fn list(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<PageQuery>,
) -> AppResult<Paginated<UserView>> {
    let page = query.resolve(state.page_size());
    let listing = state.user_service.list(page, viewer.id()).await?;

    Ok(Paginated::new(listing, page, &state.config.server.url, &uri))
}

/// Register a new user.
async fn signup(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<Response> {
    let user = state.user_service.create(input).await?;
    Ok(response::created(user))
}

/// Get the current user.
async fn me(AuthUser(user): AuthUser) -> Json<UserView> {
    Json(UserView::new(&user, false))
}

/// Set the current user's avatar.
async fn set_avatar(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(body): Json<AvatarBody>,
) -> AppResult<Json<AvatarBody>> {
    let avatar = state
        .user_service
        .set_avatar(&user, Some(body.avatar.unwrap_or_default()))
        .await?;

    Ok(Json(AvatarBody { avatar }))
}

/// Clear the current user's avatar.
async fn clear_avatar(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    state.user_service.set_avatar(&user, None).await?;
    Ok(response::ok())
}

/// Change the current user's password.
async fn set_password(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SetPasswordInput>,
) -> AppResult<impl IntoResponse> {
    state.user_service.set_password(&user, input).await?;
    Ok(response::ok())
}

/// Authors the current user follows, with their recipes.
async fn subscriptions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<SubscriptionsQuery>,
) -> AppResult<Paginated<Subscription>> {
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .resolve(state.page_size());

    let listing = state
        .following_service
        .subscriptions(&user.id, page, query.recipes_limit)
        .await?;

    Ok(Paginated::new(listing, page, &state.config.server.url, &uri))
}

/// Get a user's profile.
async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserView>> {
    let user = state.user_service.get(&id, viewer.id()).await?;
    Ok(Json(user))
}

/// Follow an author.
async fn subscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RecipesLimitQuery>,
) -> AppResult<Response> {
    let subscription = state
        .following_service
        .subscribe(&user.id, &id, query.recipes_limit)
        .await?;

    Ok(response::created(subscription))
}

/// Unfollow an author.
async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.following_service.unsubscribe(&user.id, &id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(signup))
        .route("/me", get(me))
        .route("/me/avatar", put(set_avatar).delete(clear_avatar))
        .route("/set_password", post(set_password))
        .route("/subscriptions", get(subscriptions))
        .route("/{id}", get(show))
        .route("/{id}/subscribe", post(subscribe).delete(unsubscribe))
}
