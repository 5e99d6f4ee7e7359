//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use foodgram_common::Config;
use foodgram_core::{
    FavoriteService, FollowingService, IngredientService, RecipeService, ShoppingCartService,
    ShoppingListService, TagService, UserService,
};
use foodgram_db::repositories::{
    FavoriteRepository, FollowRepository, IngredientRepository, RecipeRepository,
    ShoppingCartRepository, TagRepository, UserRepository,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub user_service: UserService,
    pub recipe_service: RecipeService,
    pub tag_service: TagService,
    pub ingredient_service: IngredientService,
    pub favorite_service: FavoriteService,
    pub shopping_cart_service: ShoppingCartService,
    pub shopping_list_service: ShoppingListService,
    pub following_service: FollowingService,
}

impl AppState {
    /// Wire repositories and services over one shared connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: Config) -> Self {
        let policy = config.recipes.toggle_policy;

        let user_repo = UserRepository::new(Arc::clone(&db));
        let recipe_repo = RecipeRepository::new(Arc::clone(&db));
        let ingredient_repo = IngredientRepository::new(Arc::clone(&db));
        let tag_repo = TagRepository::new(Arc::clone(&db));
        let favorite_repo = FavoriteRepository::new(Arc::clone(&db));
        let cart_repo = ShoppingCartRepository::new(Arc::clone(&db));
        let follow_repo = FollowRepository::new(db);

        let recipe_service = RecipeService::new(
            recipe_repo.clone(),
            ingredient_repo.clone(),
            tag_repo.clone(),
            user_repo.clone(),
            favorite_repo.clone(),
            cart_repo.clone(),
            follow_repo.clone(),
            &config,
        );

        Self {
            user_service: UserService::new(user_repo.clone(), follow_repo.clone()),
            tag_service: TagService::new(tag_repo),
            ingredient_service: IngredientService::new(ingredient_repo),
            favorite_service: FavoriteService::new(favorite_repo, recipe_repo.clone(), policy),
            shopping_cart_service: ShoppingCartService::new(
                cart_repo.clone(),
                recipe_repo.clone(),
                policy,
            ),
            shopping_list_service: ShoppingListService::new(cart_repo),
            following_service: FollowingService::new(follow_repo, user_repo, recipe_repo, policy),
            recipe_service,
            config: Arc::new(config),
        }
    }

    /// Default page size for paginated lists.
    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.config.recipes.page_size
    }
}

/// Pull the token out of `Token <t>` or `Bearer <t>`.
fn parse_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Token ")
        .or_else(|| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware.
///
/// A valid token attaches the user to the request. A token that does not
/// resolve is rejected outright; requests without one pass through anonymously.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_token)
        .map(ToOwned::to_owned);

    if let Some(token) = token {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}
