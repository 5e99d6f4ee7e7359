//! Following (subscription) service.

use std::collections::HashMap;

use foodgram_common::{AppError, AppResult, IdGenerator, TogglePolicy};
use foodgram_db::{
    entities::{follow, user},
    repositories::{FollowRepository, RecipeRepository, UserRepository},
};
use sea_orm::Set;

use super::projection::{Listing, PageRequest, RecipeSummary, Subscription, UserView};
use super::toggle;

/// Following service for subscriptions between users.
#[derive(Clone)]
pub struct FollowingService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    recipe_repo: RecipeRepository,
    policy: TogglePolicy,
    id_gen: IdGenerator,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(
        follow_repo: FollowRepository,
        user_repo: UserRepository,
        recipe_repo: RecipeRepository,
        policy: TogglePolicy,
    ) -> Self {
        Self {
            follow_repo,
            user_repo,
            recipe_repo,
            policy,
            id_gen: IdGenerator::new(),
        }
    }

    /// Subscribe to an author.
    ///
    /// Returns the author's profile with up to `recipes_limit` of their
    /// recipes, newest first.
    pub async fn subscribe(
        &self,
        user_id: &str,
        author_id: &str,
        recipes_limit: Option<u64>,
    ) -> AppResult<Subscription> {
        if user_id == author_id {
            return Err(AppError::SelfReferenceForbidden);
        }

        let author = self.user_repo.get_by_id(author_id).await?;

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            author_id: Set(author.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };
        let created = self.follow_repo.insert_if_absent(model).await?;
        toggle::settle_add(self.policy, created, "Subscription")?;

        if created {
            tracing::info!(user_id = %user_id, author_id = %author_id, "Subscribed");
        }

        self.subscription(&author, recipes_limit).await
    }

    /// Unsubscribe from an author.
    pub async fn unsubscribe(&self, user_id: &str, author_id: &str) -> AppResult<()> {
        if user_id == author_id {
            return Err(AppError::SelfReferenceForbidden);
        }

        self.user_repo.get_by_id(author_id).await?;

        let removed = self.follow_repo.delete_by_pair(user_id, author_id).await?;
        toggle::settle_remove(self.policy, removed, "Subscription")
    }

    /// The user's subscriptions, most recent first.
    pub async fn subscriptions(
        &self,
        user_id: &str,
        page: PageRequest,
        recipes_limit: Option<u64>,
    ) -> AppResult<Listing<Subscription>> {
        let count = self.follow_repo.count_by_user(user_id).await?;
        let follows = self
            .follow_repo
            .find_by_user(user_id, page.limit, page.offset())
            .await?;

        let author_ids: Vec<String> = follows.iter().map(|f| f.author_id.clone()).collect();
        let mut authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let mut results = Vec::with_capacity(follows.len());
        for author_id in &author_ids {
            if let Some(author) = authors.remove(author_id) {
                results.push(self.subscription(&author, recipes_limit).await?);
            }
        }

        Ok(Listing::new(count, results))
    }

    async fn subscription(
        &self,
        author: &user::Model,
        recipes_limit: Option<u64>,
    ) -> AppResult<Subscription> {
        let recipes_count = self.recipe_repo.count_by_author(&author.id).await?;
        let recipes = self
            .recipe_repo
            .find_by_author(&author.id, recipes_limit)
            .await?;

        Ok(Subscription {
            author: UserView::new(author, true),
            recipes_count,
            recipes: recipes.iter().map(RecipeSummary::from).collect(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use foodgram_db::entities::recipe;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            username: id.to_string(),
            first_name: "Test".to_string(),
            last_name: "Author".to_string(),
            avatar: None,
            password: "hash".to_string(),
            token: None,
            is_admin: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_recipe(id: &str, author_id: &str) -> recipe::Model {
        recipe::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            name: format!("Recipe {id}"),
            image: format!("recipes/images/{id}.png"),
            text: "Cook.".to_string(),
            cooking_time: 15,
            short_code: format!("{id:0>8}"),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn count_row(n: i64) -> [std::collections::BTreeMap<&'static str, Value>; 1] {
        [btreemap! { "num_items" => Into::<Value>::into(n) }]
    }

    fn build_service(
        follow_db: MockDatabase,
        user_db: MockDatabase,
        recipe_db: MockDatabase,
        policy: TogglePolicy,
    ) -> FollowingService {
        FollowingService::new(
            FollowRepository::new(Arc::new(follow_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
            RecipeRepository::new(Arc::new(recipe_db.into_connection())),
            policy,
        )
    }

    #[tokio::test]
    async fn test_subscribe_self_forbidden() {
        let service = build_service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            TogglePolicy::Strict,
        );

        let result = service.subscribe("u1", "u1", None).await;
        assert!(matches!(result, Err(AppError::SelfReferenceForbidden)));
    }

    #[tokio::test]
    async fn test_subscribe_unknown_author() {
        let service = build_service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
            MockDatabase::new(DatabaseBackend::Postgres),
            TogglePolicy::Strict,
        );

        let result = service.subscribe("u1", "ghost", None).await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_subscribe_returns_limited_recipes() {
        let service = build_service(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("chef")]]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_row(3)])
                .append_query_results([[
                    create_test_recipe("r3", "chef"),
                    create_test_recipe("r2", "chef"),
                ]]),
            TogglePolicy::Strict,
        );

        let subscription = service.subscribe("u1", "chef", Some(2)).await.unwrap();

        assert!(subscription.author.is_subscribed);
        assert_eq!(subscription.recipes_count, 3);
        assert_eq!(subscription.recipes.len(), 2);
        assert_eq!(subscription.recipes[0].id, "r3");
    }

    #[tokio::test]
    async fn test_subscribe_twice_strict_conflicts() {
        let service = build_service(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("chef")]]),
            MockDatabase::new(DatabaseBackend::Postgres),
            TogglePolicy::Strict,
        );

        let result = service.subscribe("u1", "chef", None).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unsubscribe_absent_strict() {
        let service = build_service(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("chef")]]),
            MockDatabase::new(DatabaseBackend::Postgres),
            TogglePolicy::Strict,
        );

        let result = service.unsubscribe("u1", "chef").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_subscriptions_keep_follow_order() {
        let now = Utc::now();
        let follows = vec![
            follow::Model {
                id: "f2".to_string(),
                user_id: "u1".to_string(),
                author_id: "b".to_string(),
                created_at: now.into(),
            },
            follow::Model {
                id: "f1".to_string(),
                user_id: "u1".to_string(),
                author_id: "a".to_string(),
                created_at: now.into(),
            },
        ];

        let service = build_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_row(2)])
                .append_query_results([follows]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("a"), create_test_user("b")]]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_row(0)])
                .append_query_results([Vec::<recipe::Model>::new()])
                .append_query_results([count_row(1)])
                .append_query_results([[create_test_recipe("r1", "a")]]),
            TogglePolicy::Strict,
        );

        let listing = service
            .subscriptions("u1", PageRequest { page: 1, limit: 6 }, None)
            .await
            .unwrap();

        assert_eq!(listing.count, 2);
        assert_eq!(listing.results[0].author.id, "b");
        assert_eq!(listing.results[0].recipes_count, 0);
        assert_eq!(listing.results[1].author.id, "a");
        assert_eq!(listing.results[1].recipes.len(), 1);
    }
}
