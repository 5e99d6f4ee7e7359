//! Recipe repository.

use std::sync::Arc;

use crate::entities::{
    Recipe, RecipeIngredient, RecipeTag, favorite, ingredient, recipe, recipe_ingredient,
    recipe_tag, shopping_cart, tag,
};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Select, TransactionTrait,
    sea_query::{Expr, Query},
};

use super::map_write_err;

/// Filters for the recipe list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Match recipes carrying any of these tag slugs.
    pub tag_slugs: Vec<String>,
    /// Only recipes by this author.
    pub author_id: Option<String>,
    /// Only recipes favorited by this user.
    pub favorited_by: Option<String>,
    /// Only recipes in this user's shopping cart.
    pub in_cart_of: Option<String>,
}

/// An ingredient line of a recipe, joined with the ingredient itself.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
#[allow(missing_docs)]
pub struct RecipeIngredientRow {
    pub recipe_id: String,
    pub ingredient_id: String,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// A tag attached to a recipe.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
#[allow(missing_docs)]
pub struct RecipeTagRow {
    pub recipe_id: String,
    pub tag_id: String,
    pub name: String,
    pub color: String,
    pub slug: String,
}

/// Recipe repository for database operations.
#[derive(Clone)]
pub struct RecipeRepository {
    db: Arc<DatabaseConnection>,
}

impl RecipeRepository {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a recipe by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<recipe::Model>> {
        Recipe::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a recipe by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<recipe::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::RecipeNotFound(id.to_string()))
    }

    /// Find a recipe by its short-link code.
    pub async fn find_by_short_code(&self, code: &str) -> AppResult<Option<recipe::Model>> {
        Recipe::find()
            .filter(recipe::Column::ShortCode.eq(code))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a recipe together with its ingredient and tag rows.
    ///
    /// Everything is written in one transaction; on any failure nothing is kept.
    pub async fn create(
        &self,
        model: recipe::ActiveModel,
        ingredients: Vec<recipe_ingredient::ActiveModel>,
        tags: Vec<recipe_tag::ActiveModel>,
    ) -> AppResult<recipe::Model> {
        let txn = self.begin().await?;

        let created = model
            .insert(&txn)
            .await
            .map_err(|e| map_write_err(e, "recipe"))?;
        insert_ingredients(&txn, ingredients).await?;
        insert_tags(&txn, tags).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Update a recipe and replace the association sets that are given.
    ///
    /// `None` leaves the existing rows of that kind untouched.
    pub async fn update(
        &self,
        model: recipe::ActiveModel,
        ingredients: Option<Vec<recipe_ingredient::ActiveModel>>,
        tags: Option<Vec<recipe_tag::ActiveModel>>,
    ) -> AppResult<recipe::Model> {
        let txn = self.begin().await?;

        let updated = model
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(ingredients) = ingredients {
            RecipeIngredient::delete_many()
                .filter(recipe_ingredient::Column::RecipeId.eq(updated.id.as_str()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            insert_ingredients(&txn, ingredients).await?;
        }

        if let Some(tags) = tags {
            RecipeTag::delete_many()
                .filter(recipe_tag::Column::RecipeId.eq(updated.id.as_str()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            insert_tags(&txn, tags).await?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }

    /// Delete a recipe. Associations and edges go with it by cascade.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Recipe::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// List recipes matching a filter, newest first.
    pub async fn search(
        &self,
        filter: &RecipeFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<recipe::Model>> {
        apply_filter(Recipe::find(), filter)
            .order_by_desc(recipe::Column::CreatedAt)
            .order_by_desc(recipe::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count recipes matching a filter.
    pub async fn count(&self, filter: &RecipeFilter) -> AppResult<u64> {
        apply_filter(Recipe::find(), filter)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an author's recipes, newest first, optionally limited.
    pub async fn find_by_author(
        &self,
        author_id: &str,
        limit: Option<u64>,
    ) -> AppResult<Vec<recipe::Model>> {
        let mut query = Recipe::find()
            .filter(recipe::Column::AuthorId.eq(author_id))
            .order_by_desc(recipe::Column::CreatedAt)
            .order_by_desc(recipe::Column::Id);

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count an author's recipes.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        Recipe::find()
            .filter(recipe::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Ingredient lines of the given recipes, ordered by ingredient name.
    pub async fn ingredient_rows(
        &self,
        recipe_ids: &[String],
    ) -> AppResult<Vec<RecipeIngredientRow>> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }

        RecipeIngredient::find()
            .select_only()
            .column(recipe_ingredient::Column::RecipeId)
            .column(recipe_ingredient::Column::IngredientId)
            .column(ingredient::Column::Name)
            .column(ingredient::Column::MeasurementUnit)
            .column(recipe_ingredient::Column::Amount)
            .join(JoinType::InnerJoin, recipe_ingredient::Relation::Ingredient.def())
            .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.to_vec()))
            .order_by_asc(ingredient::Column::Name)
            .into_model::<RecipeIngredientRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tags of the given recipes, ordered by tag name.
    pub async fn tag_rows(&self, recipe_ids: &[String]) -> AppResult<Vec<RecipeTagRow>> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }

        RecipeTag::find()
            .select_only()
            .column(recipe_tag::Column::RecipeId)
            .column(recipe_tag::Column::TagId)
            .column(tag::Column::Name)
            .column(tag::Column::Color)
            .column(tag::Column::Slug)
            .join(JoinType::InnerJoin, recipe_tag::Relation::Tag.def())
            .filter(recipe_tag::Column::RecipeId.is_in(recipe_ids.to_vec()))
            .order_by_asc(tag::Column::Name)
            .into_model::<RecipeTagRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

async fn insert_ingredients(
    txn: &DatabaseTransaction,
    rows: Vec<recipe_ingredient::ActiveModel>,
) -> AppResult<()> {
    if rows.is_empty() {
        return Ok(());
    }

    RecipeIngredient::insert_many(rows)
        .exec_without_returning(txn)
        .await
        .map_err(|e| map_write_err(e, "recipe ingredient"))?;
    Ok(())
}

async fn insert_tags(txn: &DatabaseTransaction, rows: Vec<recipe_tag::ActiveModel>) -> AppResult<()> {
    if rows.is_empty() {
        return Ok(());
    }

    RecipeTag::insert_many(rows)
        .exec_without_returning(txn)
        .await
        .map_err(|e| map_write_err(e, "recipe tag"))?;
    Ok(())
}

fn apply_filter(mut query: Select<Recipe>, filter: &RecipeFilter) -> Select<Recipe> {
    if !filter.tag_slugs.is_empty() {
        let tagged = Query::select()
            .column((recipe_tag::Entity, recipe_tag::Column::RecipeId))
            .from(recipe_tag::Entity)
            .inner_join(
                tag::Entity,
                Expr::col((tag::Entity, tag::Column::Id))
                    .equals((recipe_tag::Entity, recipe_tag::Column::TagId)),
            )
            .and_where(tag::Column::Slug.is_in(filter.tag_slugs.clone()))
            .to_owned();
        query = query.filter(recipe::Column::Id.in_subquery(tagged));
    }

    if let Some(author_id) = &filter.author_id {
        query = query.filter(recipe::Column::AuthorId.eq(author_id.as_str()));
    }

    if let Some(user_id) = &filter.favorited_by {
        let favorited = Query::select()
            .column(favorite::Column::RecipeId)
            .from(favorite::Entity)
            .and_where(favorite::Column::UserId.eq(user_id.as_str()))
            .to_owned();
        query = query.filter(recipe::Column::Id.in_subquery(favorited));
    }

    if let Some(user_id) = &filter.in_cart_of {
        let in_cart = Query::select()
            .column(shopping_cart::Column::RecipeId)
            .from(shopping_cart::Entity)
            .and_where(shopping_cart::Column::UserId.eq(user_id.as_str()))
            .to_owned();
        query = query.filter(recipe::Column::Id.in_subquery(in_cart));
    }

    query
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, Set, Value};

    fn create_test_recipe(id: &str, author_id: &str) -> recipe::Model {
        recipe::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            name: "Pancakes".to_string(),
            image: "recipes/images/pancakes.png".to_string(),
            text: "Mix and fry.".to_string(),
            cooking_time: 20,
            short_code: "abcd1234".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn active_from(model: &recipe::Model) -> recipe::ActiveModel {
        recipe::ActiveModel {
            id: Set(model.id.clone()),
            author_id: Set(model.author_id.clone()),
            name: Set(model.name.clone()),
            image: Set(model.image.clone()),
            text: Set(model.text.clone()),
            cooking_time: Set(model.cooking_time),
            short_code: Set(model.short_code.clone()),
            created_at: Set(model.created_at),
            updated_at: Set(None),
        }
    }

    fn ingredient_row(recipe_id: &str, ingredient_id: &str) -> recipe_ingredient::ActiveModel {
        recipe_ingredient::ActiveModel {
            id: Set(format!("{recipe_id}-{ingredient_id}")),
            recipe_id: Set(recipe_id.to_string()),
            ingredient_id: Set(ingredient_id.to_string()),
            amount: Set(100),
        }
    }

    fn tag_row(recipe_id: &str, tag_id: &str) -> recipe_tag::ActiveModel {
        recipe_tag::ActiveModel {
            id: Set(format!("{recipe_id}-{tag_id}")),
            recipe_id: Set(recipe_id.to_string()),
            tag_id: Set(tag_id.to_string()),
        }
    }

    fn exec_ok(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    /// Leading SQL keyword of every logged statement, one list per transaction.
    fn logged_statements(db: Arc<DatabaseConnection>) -> Vec<Vec<String>> {
        let conn = Arc::try_unwrap(db).ok().unwrap();
        conn.into_transaction_log()
            .iter()
            .map(|txn| {
                format!("{txn:?}")
                    .split("sql: \"")
                    .skip(1)
                    .map(|sql| sql.chars().take_while(char::is_ascii_alphabetic).collect())
                    .collect()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_create_runs_in_one_transaction() {
        let recipe = create_test_recipe("r1", "u1");

        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[recipe.clone()]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ]);
        let db = Arc::new(mock.into_connection());

        let repo = RecipeRepository::new(db);
        let created = repo
            .create(
                active_from(&recipe),
                vec![ingredient_row("r1", "i1"), ingredient_row("r1", "i2")],
                vec![tag_row("r1", "t1")],
            )
            .await
            .unwrap();

        assert_eq!(created.id, "r1");
        assert_eq!(created.short_code, "abcd1234");
    }

    #[tokio::test]
    async fn test_create_rolls_back_when_tag_insert_fails() {
        let recipe = create_test_recipe("r1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[recipe.clone()]])
                .append_exec_results([exec_ok(1)])
                .append_exec_errors([DbErr::Custom("tag insert failed".to_string())])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db.clone());
        let result = repo
            .create(
                active_from(&recipe),
                vec![ingredient_row("r1", "i1")],
                vec![tag_row("r1", "t1")],
            )
            .await;
        drop(repo);

        assert!(matches!(result, Err(AppError::Database(msg)) if msg.contains("tag insert failed")));

        let log = logged_statements(db);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0], ["BEGIN", "INSERT", "INSERT", "INSERT", "ROLLBACK"]);
        assert!(!log[0].iter().any(|stmt| stmt == "COMMIT"));
    }

    #[tokio::test]
    async fn test_update_replaces_associations_in_one_transaction() {
        let recipe = create_test_recipe("r1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[recipe.clone()]])
                .append_exec_results([exec_ok(2), exec_ok(1), exec_ok(1), exec_ok(2)])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db.clone());
        let updated = repo
            .update(
                active_from(&recipe),
                Some(vec![ingredient_row("r1", "i3")]),
                Some(vec![tag_row("r1", "t1"), tag_row("r1", "t2")]),
            )
            .await
            .unwrap();
        drop(repo);

        assert_eq!(updated.id, "r1");

        let log = logged_statements(db);
        assert_eq!(log.len(), 1);
        assert_eq!(
            log[0],
            ["BEGIN", "UPDATE", "DELETE", "INSERT", "DELETE", "INSERT", "COMMIT"]
        );
    }

    #[tokio::test]
    async fn test_update_rolls_back_when_tag_insert_fails() {
        let recipe = create_test_recipe("r1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[recipe.clone()]])
                .append_exec_results([exec_ok(2), exec_ok(1), exec_ok(1)])
                .append_exec_errors([DbErr::Custom("tag insert failed".to_string())])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db.clone());
        let result = repo
            .update(
                active_from(&recipe),
                Some(vec![ingredient_row("r1", "i3")]),
                Some(vec![tag_row("r1", "t1")]),
            )
            .await;
        drop(repo);

        assert!(matches!(result, Err(AppError::Database(msg)) if msg.contains("tag insert failed")));

        let log = logged_statements(db);
        assert_eq!(log.len(), 1);
        assert_eq!(
            log[0],
            ["BEGIN", "UPDATE", "DELETE", "INSERT", "DELETE", "INSERT", "ROLLBACK"]
        );
        assert!(!log[0].iter().any(|stmt| stmt == "COMMIT"));
    }

    #[tokio::test]
    async fn test_update_keeps_associations_when_omitted() {
        let recipe = create_test_recipe("r1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[recipe.clone()]])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db);
        let updated = repo.update(active_from(&recipe), None, None).await.unwrap();

        assert_eq!(updated.name, "Pancakes");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<recipe::Model>::new()])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::RecipeNotFound(_))));
    }

    #[tokio::test]
    async fn test_search_with_filters() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_recipe("r2", "u1"),
                    create_test_recipe("r1", "u1"),
                ]])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db);
        let filter = RecipeFilter {
            tag_slugs: vec!["breakfast".to_string()],
            author_id: Some("u1".to_string()),
            favorited_by: Some("u2".to_string()),
            in_cart_of: None,
        };
        let result = repo.search(&filter, 6, 0).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "r2");
    }

    #[tokio::test]
    async fn test_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! { "num_items" => Into::<Value>::into(3i64) }]])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db);
        assert_eq!(repo.count(&RecipeFilter::default()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_ingredient_rows_empty_input() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = RecipeRepository::new(db);
        assert!(repo.ingredient_rows(&[]).await.unwrap().is_empty());
    }
}
