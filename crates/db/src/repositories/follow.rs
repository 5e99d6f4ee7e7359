//! Follow (subscription) repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{Follow, follow};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::OnConflict,
};

/// Follow repository for database operations.
#[derive(Clone)]
pub struct FollowRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRepository {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a subscription by follower and author.
    pub async fn find_by_pair(
        &self,
        user_id: &str,
        author_id: &str,
    ) -> AppResult<Option<follow::Model>> {
        Follow::find()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is subscribed to an author.
    pub async fn is_following(&self, user_id: &str, author_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(user_id, author_id).await?.is_some())
    }

    /// Of the given authors, return those the user is subscribed to.
    pub async fn following_among(
        &self,
        user_id: &str,
        author_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        if author_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<String> = Follow::find()
            .select_only()
            .column(follow::Column::AuthorId)
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.is_in(author_ids.to_vec()))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(ids.into_iter().collect())
    }

    /// Insert the subscription unless it already exists. Returns `true` when created.
    pub async fn insert_if_absent(&self, model: follow::ActiveModel) -> AppResult<bool> {
        let inserted = Follow::insert(model)
            .on_conflict(
                OnConflict::columns([follow::Column::UserId, follow::Column::AuthorId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// Delete the subscription. Returns `true` when a row was removed.
    pub async fn delete_by_pair(&self, user_id: &str, author_id: &str) -> AppResult<bool> {
        let result = Follow::delete_many()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Get a user's subscriptions, newest first.
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<follow::Model>> {
        Follow::find()
            .filter(follow::Column::UserId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .order_by_desc(follow::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a user's subscriptions.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
