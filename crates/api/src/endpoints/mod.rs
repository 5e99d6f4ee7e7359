//! API endpoints.

mod auth;
mod ingredients;
mod recipes;
mod short_links;
mod tags;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router, mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/tags", tags::router())
        .nest("/ingredients", ingredients::router())
        .nest("/recipes", recipes::router())
}

/// Routes served at the site root.
pub fn root_router() -> Router<AppState> {
    short_links::router()
}
