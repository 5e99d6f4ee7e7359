//! Repository layer.
//!
//! Each repository wraps a shared [`DatabaseConnection`](sea_orm::DatabaseConnection)
//! and maps `DbErr` into [`AppError`].

mod favorite;
mod follow;
mod ingredient;
mod recipe;
mod shopping_cart;
mod tag;
mod user;

pub use favorite::FavoriteRepository;
pub use follow::FollowRepository;
pub use ingredient::IngredientRepository;
pub use recipe::{RecipeFilter, RecipeIngredientRow, RecipeRepository, RecipeTagRow};
pub use shopping_cart::{CartIngredientRow, ShoppingCartRepository};
pub use tag::TagRepository;
pub use user::UserRepository;

use foodgram_common::AppError;
use sea_orm::{DbErr, SqlErr};

/// Map a write error, turning unique-constraint violations into `Conflict`.
pub(crate) fn map_write_err(err: DbErr, what: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict(format!("{what} already exists"))
        }
        _ => AppError::Database(err.to_string()),
    }
}
