//! Favorite (bookmarked recipe) service.

use foodgram_common::{AppResult, IdGenerator, TogglePolicy};
use foodgram_db::{
    entities::favorite,
    repositories::{FavoriteRepository, RecipeRepository},
};
use sea_orm::Set;

use super::projection::RecipeSummary;
use super::toggle;

/// Favorite service for bookmarking recipes.
#[derive(Clone)]
pub struct FavoriteService {
    favorite_repo: FavoriteRepository,
    recipe_repo: RecipeRepository,
    policy: TogglePolicy,
    id_gen: IdGenerator,
}

impl FavoriteService {
    /// Create a new favorite service.
    #[must_use]
    pub const fn new(
        favorite_repo: FavoriteRepository,
        recipe_repo: RecipeRepository,
        policy: TogglePolicy,
    ) -> Self {
        Self {
            favorite_repo,
            recipe_repo,
            policy,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a recipe to the user's favorites.
    pub async fn add(&self, user_id: &str, recipe_id: &str) -> AppResult<RecipeSummary> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;

        let model = favorite::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            recipe_id: Set(recipe.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };
        let created = self.favorite_repo.insert_if_absent(model).await?;
        toggle::settle_add(self.policy, created, "Favorite")?;

        Ok(RecipeSummary::from(&recipe))
    }

    /// Remove a recipe from the user's favorites.
    pub async fn remove(&self, user_id: &str, recipe_id: &str) -> AppResult<()> {
        self.recipe_repo.get_by_id(recipe_id).await?;

        let removed = self.favorite_repo.delete_by_pair(user_id, recipe_id).await?;
        toggle::settle_remove(self.policy, removed, "Favorite")
    }
}
