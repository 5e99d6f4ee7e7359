//! Shopping cart repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{
    RecipeIngredient, ShoppingCart, ingredient, recipe_ingredient, shopping_cart,
};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QuerySelect, RelationTrait,
    sea_query::{OnConflict, Query},
};

/// One ingredient line of a recipe currently in a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct CartIngredientRow {
    /// Ingredient name.
    pub name: String,
    /// Ingredient measurement unit.
    pub measurement_unit: String,
    /// Amount used by the recipe.
    pub amount: i32,
}

/// Shopping cart repository for database operations.
#[derive(Clone)]
pub struct ShoppingCartRepository {
    db: Arc<DatabaseConnection>,
}

impl ShoppingCartRepository {
    /// Create a new shopping cart repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Of the given recipes, return those in the user's cart.
    pub async fn in_cart_among(
        &self,
        user_id: &str,
        recipe_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<String> = ShoppingCart::find()
            .select_only()
            .column(shopping_cart::Column::RecipeId)
            .filter(shopping_cart::Column::UserId.eq(user_id))
            .filter(shopping_cart::Column::RecipeId.is_in(recipe_ids.to_vec()))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(ids.into_iter().collect())
    }

    /// Insert the edge unless it already exists. Returns `true` when created.
    pub async fn insert_if_absent(&self, model: shopping_cart::ActiveModel) -> AppResult<bool> {
        let inserted = ShoppingCart::insert(model)
            .on_conflict(
                OnConflict::columns([
                    shopping_cart::Column::UserId,
                    shopping_cart::Column::RecipeId,
                ])
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
        let result = ShoppingCart::delete_many()
            .filter(shopping_cart::Column::UserId.eq(user_id))
            .filter(shopping_cart::Column::RecipeId.eq(recipe_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Every ingredient line of every recipe in the user's cart.
    pub async fn ingredient_rows(&self, user_id: &str) -> AppResult<Vec<CartIngredientRow>> {
        let cart_recipes = Query::select()
            .column(shopping_cart::Column::RecipeId)
            .from(shopping_cart::Entity)
            .and_where(shopping_cart::Column::UserId.eq(user_id))
            .to_owned();

        RecipeIngredient::find()
            .select_only()
            .column(ingredient::Column::Name)
            .column(ingredient::Column::MeasurementUnit)
            .column(recipe_ingredient::Column::Amount)
            .join(JoinType::InnerJoin, recipe_ingredient::Relation::Ingredient.def())
            .filter(recipe_ingredient::Column::RecipeId.in_subquery(cart_recipes))
            .into_model::<CartIngredientRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    #[tokio::test]
    async fn test_ingredient_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    btreemap! {
                        "name" => Into::<Value>::into("flour"),
                        "measurement_unit" => Into::<Value>::into("g"),
                        "amount" => Into::<Value>::into(200i32),
                    },
                    btreemap! {
                        "name" => Into::<Value>::into("eggs"),
                        "measurement_unit" => Into::<Value>::into("pcs"),
                        "amount" => Into::<Value>::into(2i32),
                    },
                ]])
                .into_connection(),
        );

        let repo = ShoppingCartRepository::new(db);
        let rows = repo.ingredient_rows("u1").await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            CartIngredientRow {
                name: "flour".to_string(),
                measurement_unit: "g".to_string(),
                amount: 200,
            }
        );
    }

    #[tokio::test]
    async fn test_delete_by_pair_present() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ShoppingCartRepository::new(db);
        assert!(repo.delete_by_pair("u1", "r1").await.unwrap());
    }

    #[tokio::test]
    async fn test_in_cart_among_empty_input() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = ShoppingCartRepository::new(db);
        assert!(repo.in_cart_among("u1", &[]).await.unwrap().is_empty());
    }
}
