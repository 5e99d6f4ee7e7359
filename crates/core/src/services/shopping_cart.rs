//! Shopping cart service.

use foodgram_common::{AppResult, IdGenerator, TogglePolicy};
use foodgram_db::{
    entities::shopping_cart,
    repositories::{RecipeRepository, ShoppingCartRepository},
};
use sea_orm::Set;

use super::projection::RecipeSummary;
use super::toggle;

/// Shopping cart service for adding and removing recipes.
#[derive(Clone)]
pub struct ShoppingCartService {
    cart_repo: ShoppingCartRepository,
    recipe_repo: RecipeRepository,
    policy: TogglePolicy,
    id_gen: IdGenerator,
}

impl ShoppingCartService {
    /// Create a new shopping cart service.
    #[must_use]
    pub const fn new(
        cart_repo: ShoppingCartRepository,
        recipe_repo: RecipeRepository,
        policy: TogglePolicy,
    ) -> Self {
        Self {
            cart_repo,
            recipe_repo,
            policy,
            id_gen: IdGenerator::new(),
        }
    }

    /// Put a recipe into the user's cart.
    pub async fn add(&self, user_id: &str, recipe_id: &str) -> AppResult<RecipeSummary> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;

        let model = shopping_cart::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            recipe_id: Set(recipe.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };
        let created = self.cart_repo.insert_if_absent(model).await?;
        toggle::settle_add(self.policy, created, "Shopping cart entry")?;

        Ok(RecipeSummary::from(&recipe))
    }

    /// Take a recipe out of the user's cart.
    pub async fn remove(&self, user_id: &str, recipe_id: &str) -> AppResult<()> {
        self.recipe_repo.get_by_id(recipe_id).await?;

        let removed = self.cart_repo.delete_by_pair(user_id, recipe_id).await?;
        toggle::settle_remove(self.policy, removed, "Shopping cart entry")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use foodgram_common::AppError;
    use foodgram_db::entities::recipe;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_recipe(id: &str) -> recipe::Model {
        recipe::Model {
            id: id.to_string(),
            author_id: "author".to_string(),
            name: "Omelette".to_string(),
            image: "recipes/images/omelette.png".to_string(),
            text: "Whisk and cook.".to_string(),
            cooking_time: 10,
            short_code: "omelet01".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn build_service(rows_affected: u64, policy: TogglePolicy) -> ShoppingCartService {
        let cart_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected,
            }])
            .into_connection();
        let recipe_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_recipe("r1")]])
            .into_connection();

        ShoppingCartService::new(
            ShoppingCartRepository::new(Arc::new(cart_db)),
            RecipeRepository::new(Arc::new(recipe_db)),
            policy,
        )
    }

    #[tokio::test]
    async fn test_add() {
        let summary = build_service(1, TogglePolicy::Strict)
            .add("u1", "r1")
            .await
            .unwrap();
        assert_eq!(summary.cooking_time, 10);
    }

    #[tokio::test]
    async fn test_add_existing_strict() {
        let result = build_service(0, TogglePolicy::Strict).add("u1", "r1").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_remove_absent_idempotent() {
        let result = build_service(0, TogglePolicy::Idempotent)
            .remove("u1", "r1")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_remove_absent_strict() {
        let result = build_service(0, TogglePolicy::Strict).remove("u1", "r1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
