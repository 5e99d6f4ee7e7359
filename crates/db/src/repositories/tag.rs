//! Tag repository.

use std::sync::Arc;

use crate::entities::{Tag, tag};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

use super::map_write_err;

/// Tag repository for database operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a tag by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<tag::Model>> {
        Tag::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find tags by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<tag::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Tag::find()
            .filter(tag::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all tags ordered by name.
    pub async fn list(&self) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a tag.
    pub async fn create(&self, model: tag::ActiveModel) -> AppResult<tag::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_write_err(e, "tag"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_tag(id: &str, slug: &str) -> tag::Model {
        tag::Model {
            id: id.to_string(),
            name: slug.to_uppercase(),
            color: "#E26C2D".to_string(),
            slug: slug.to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_by_ids() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_tag("t1", "breakfast")]])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        let result = repo
            .find_by_ids(&["t1".to_string(), "t9".to_string()])
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].slug, "breakfast");
    }

    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<tag::Model>::new()])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        assert!(repo.find_by_id("t9").await.unwrap().is_none());
    }
}
