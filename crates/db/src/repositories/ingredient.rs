//! Ingredient repository.

use std::sync::Arc;

use crate::entities::{Ingredient, ingredient};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::{Expr, Func, OnConflict},
};

/// Ingredient repository for database operations.
#[derive(Clone)]
pub struct IngredientRepository {
    db: Arc<DatabaseConnection>,
}

impl IngredientRepository {
    /// Create a new ingredient repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an ingredient by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<ingredient::Model>> {
        Ingredient::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find ingredients by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<ingredient::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Ingredient::find()
            .filter(ingredient::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List ingredients ordered by name, optionally filtered by a
    /// case-insensitive name prefix.
    pub async fn list(&self, name_prefix: Option<&str>) -> AppResult<Vec<ingredient::Model>> {
        let mut query = Ingredient::find();

        if let Some(prefix) = name_prefix.filter(|p| !p.is_empty()) {
            let pattern = format!("{}%", escape_like(&prefix.to_lowercase()));
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(ingredient::Column::Name))).like(pattern),
            );
        }

        query
            .order_by_asc(ingredient::Column::Name)
            .order_by_asc(ingredient::Column::MeasurementUnit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert an ingredient unless the (name, unit) pair already exists.
    ///
    /// Returns `true` when a row was created.
    pub async fn insert_if_absent(&self, model: ingredient::ActiveModel) -> AppResult<bool> {
        let inserted = Ingredient::insert(model)
            .on_conflict(
                OnConflict::columns([
                    ingredient::Column::Name,
                    ingredient::Column::MeasurementUnit,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_ingredient(id: &str, name: &str, unit: &str) -> ingredient::Model {
        ingredient::Model {
            id: id.to_string(),
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_with_prefix() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_ingredient("i1", "flour", "g"),
                    create_test_ingredient("i2", "flour", "kg"),
                ]])
                .into_connection(),
        );

        let repo = IngredientRepository::new(db);
        let result = repo.list(Some("Fl")).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].measurement_unit, "g");
    }

    #[tokio::test]
    async fn test_insert_if_absent_reports_skip() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = IngredientRepository::new(db);
        let model = ingredient::ActiveModel {
            id: Set("i1".to_string()),
            name: Set("salt".to_string()),
            measurement_unit: Set("g".to_string()),
        };

        assert!(repo.insert_if_absent(model.clone()).await.unwrap());
        assert!(!repo.insert_if_absent(model).await.unwrap());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
    }
}
