//! Favorite repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{Favorite, favorite};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
    sea_query::OnConflict,
};

/// Favorite repository for database operations.
#[derive(Clone)]
pub struct FavoriteRepository {
    db: Arc<DatabaseConnection>,
}

impl FavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Of the given recipes, return those the user has favorited.
    pub async fn favorited_among(
        &self,
        user_id: &str,
        recipe_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<String> = Favorite::find()
            .select_only()
            .column(favorite::Column::RecipeId)
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::RecipeId.is_in(recipe_ids.to_vec()))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(ids.into_iter().collect())
    }

    /// Insert the edge unless it already exists.
    ///
    /// Returns `true` when the edge was created. Backed by the unique
    /// (`user_id`, `recipe_id`) index, so concurrent calls create at most one row.
    pub async fn insert_if_absent(&self, model: favorite::ActiveModel) -> AppResult<bool> {
        let inserted = Favorite::insert(model)
            .on_conflict(
                OnConflict::columns([favorite::Column::UserId, favorite::Column::RecipeId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// Delete the edge. Returns `true` when a row was removed.
    pub async fn delete_by_pair(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        let result = Favorite::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::RecipeId.eq(recipe_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Count a user's favorites.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
