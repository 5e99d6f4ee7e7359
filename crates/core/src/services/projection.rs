//! Output projections.
//!
//! Each projection is a reduced view of an entity for one response context.
//! Viewer-dependent flags are computed by the services and passed in.

use foodgram_db::{
    entities::{recipe, tag, user},
    repositories::{RecipeIngredientRow, RecipeTagRow},
};
use serde::Serialize;

/// Minimal recipe view used by toggles and subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeSummary {
    pub id: String,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<&recipe::Model> for RecipeSummary {
    fn from(recipe: &recipe::Model) -> Self {
        Self {
            id: recipe.id.clone(),
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Public profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub is_subscribed: bool,
}

impl UserView {
    /// Build the view. `is_subscribed` is whether the viewer follows this user.
    #[must_use]
    pub fn new(user: &user::Model, is_subscribed: bool) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            avatar: user.avatar.clone(),
            is_subscribed,
        }
    }
}

/// Response body of a successful signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&user::Model> for RegisteredUser {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagView {
    pub id: String,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl From<tag::Model> for TagView {
    fn from(tag: tag::Model) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            color: tag.color,
            slug: tag.slug,
        }
    }
}

impl From<RecipeTagRow> for TagView {
    fn from(row: RecipeTagRow) -> Self {
        Self {
            id: row.tag_id,
            name: row.name,
            color: row.color,
            slug: row.slug,
        }
    }
}

/// An ingredient with the amount a recipe uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeIngredientView {
    pub id: String,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipeIngredientRow> for RecipeIngredientView {
    fn from(row: RecipeIngredientRow) -> Self {
        Self {
            id: row.ingredient_id,
            name: row.name,
            measurement_unit: row.measurement_unit,
            amount: row.amount,
        }
    }
}

/// Full read form of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeView {
    pub id: String,
    pub tags: Vec<TagView>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// An author the viewer follows, with a preview of their recipes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    #[serde(flatten)]
    pub author: UserView,
    pub recipes_count: u64,
    pub recipes: Vec<RecipeSummary>,
}

/// One page of a list plus the total number of matching items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing<T> {
    pub count: u64,
    pub results: Vec<T>,
}

impl<T> Listing<T> {
    /// Wrap a page of results.
    #[must_use]
    pub const fn new(count: u64, results: Vec<T>) -> Self {
        Self { count, results }
    }
}

/// Largest row offset the database accepts (`BIGINT`).
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Page/limit pair resolved from a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Resolve optional query values, falling back to the default page size.
    #[must_use]
    pub fn resolve(page: Option<u64>, limit: Option<u64>, default_limit: u64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.filter(|l| *l > 0).unwrap_or(default_limit),
        }
    }

    /// Number of rows to skip, saturating at the largest offset Postgres accepts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        let offset = (self.page - 1).saturating_mul(self.limit);
        if offset > MAX_OFFSET { MAX_OFFSET } else { offset }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_user() -> user::Model {
        user::Model {
            id: "u1".to_string(),
            email: "cook@example.com".to_string(),
            username: "cook".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Cook".to_string(),
            avatar: Some("users/avatar.png".to_string()),
            password: "hash".to_string(),
            token: Some("secret".to_string()),
            is_admin: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_user_view_hides_credentials() {
        let view = UserView::new(&create_test_user(), true);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["is_subscribed"], true);
        assert_eq!(json["avatar"], "users/avatar.png");
        assert!(json.get("password").is_none());
        assert!(json.get("token").is_none());
    }

    #[test]
    fn test_subscription_flattens_author() {
        let subscription = Subscription {
            author: UserView::new(&create_test_user(), true),
            recipes_count: 4,
            recipes: vec![],
        };
        let json = serde_json::to_value(&subscription).unwrap();

        assert_eq!(json["username"], "cook");
        assert_eq!(json["recipes_count"], 4);
        assert!(json["recipes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_page_request_resolve() {
        let page = PageRequest::resolve(None, None, 6);
        assert_eq!(page, PageRequest { page: 1, limit: 6 });
        assert_eq!(page.offset(), 0);

        let page = PageRequest::resolve(Some(3), Some(10), 6);
        assert_eq!(page.offset(), 20);

        let page = PageRequest::resolve(Some(0), Some(0), 6);
        assert_eq!(page, PageRequest { page: 1, limit: 6 });
    }

    #[test]
    fn test_page_request_offset_saturates() {
        let page = PageRequest::resolve(Some(u64::MAX), Some(2), 6);
        assert_eq!(page.offset(), MAX_OFFSET);

        let page = PageRequest::resolve(Some(2), Some(u64::MAX), 6);
        assert_eq!(page.offset(), MAX_OFFSET);
    }
}
