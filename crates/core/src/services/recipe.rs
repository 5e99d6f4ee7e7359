//! Recipe service.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use foodgram_common::{AppError, AppResult, Config, IdGenerator, RecipeLimits, error::reason};
use foodgram_db::{
    entities::{recipe, recipe_ingredient, recipe_tag, user},
    repositories::{
        FavoriteRepository, FollowRepository, IngredientRepository, RecipeFilter,
        RecipeRepository, ShoppingCartRepository, TagRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::projection::{
    Listing, PageRequest, RecipeIngredientView, RecipeView, TagView, UserView,
};
use super::recipe_validator;

/// Attempts at drawing an unused short code before giving up.
const SHORT_CODE_ATTEMPTS: usize = 3;

/// An ingredient reference with the amount a recipe uses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecipeIngredientInput {
    pub id: String,
    /// Wider than the stored column so oversized values reach range checks.
    pub amount: i64,
}

/// Input for creating a recipe.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRecipeInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    /// Opaque image reference.
    #[validate(length(min = 1))]
    pub image: String,

    #[validate(length(min = 1))]
    pub text: String,

    pub cooking_time: i64,

    #[serde(default)]
    pub ingredients: Vec<RecipeIngredientInput>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Input for updating a recipe. Omitted fields keep their values.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRecipeInput {
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,

    #[validate(length(min = 1))]
    pub image: Option<String>,

    #[validate(length(min = 1))]
    pub text: Option<String>,

    pub cooking_time: Option<i64>,

    pub ingredients: Option<Vec<RecipeIngredientInput>>,

    pub tags: Option<Vec<String>>,
}

/// Recipe list filters as requested by a viewer.
#[derive(Debug, Clone, Default)]
pub struct RecipeQuery {
    pub tags: Vec<String>,
    pub author: Option<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Recipe service for authoring and reading recipes.
#[derive(Clone)]
pub struct RecipeService {
    recipe_repo: RecipeRepository,
    ingredient_repo: IngredientRepository,
    tag_repo: TagRepository,
    user_repo: UserRepository,
    favorite_repo: FavoriteRepository,
    cart_repo: ShoppingCartRepository,
    follow_repo: FollowRepository,
    limits: RecipeLimits,
    id_gen: IdGenerator,
    server_url: String,
}

impl RecipeService {
    /// Create a new recipe service.
    #[must_use]
    pub fn new(
        recipe_repo: RecipeRepository,
        ingredient_repo: IngredientRepository,
        tag_repo: TagRepository,
        user_repo: UserRepository,
        favorite_repo: FavoriteRepository,
        cart_repo: ShoppingCartRepository,
        follow_repo: FollowRepository,
        config: &Config,
    ) -> Self {
        Self {
            recipe_repo,
            ingredient_repo,
            tag_repo,
            user_repo,
            favorite_repo,
            cart_repo,
            follow_repo,
            limits: config.recipes.limits(),
            id_gen: IdGenerator::new(),
            server_url: config.server.url.trim_end_matches('/').to_string(),
        }
    }

    /// The rules this service enforces.
    #[must_use]
    pub const fn limits(&self) -> &RecipeLimits {
        &self.limits
    }

    /// Create a recipe authored by `author`.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreateRecipeInput,
    ) -> AppResult<RecipeView> {
        recipe_validator::validate_create(&input, &self.limits)?;
        self.ensure_ingredients_exist(&input.ingredients).await?;
        self.ensure_tags_exist(&input.tags).await?;

        let recipe_id = self.id_gen.generate();
        let cooking_time = recipe_validator::narrow(input.cooking_time, "cooking_time")?;
        let now = Utc::now();

        let mut attempt = 0;
        let created = loop {
            attempt += 1;
            let model = recipe::ActiveModel {
                id: Set(recipe_id.clone()),
                author_id: Set(author.id.clone()),
                name: Set(input.name.clone()),
                image: Set(input.image.clone()),
                text: Set(input.text.clone()),
                cooking_time: Set(cooking_time),
                short_code: Set(self.id_gen.generate_short_code()),
                created_at: Set(now.into()),
                updated_at: Set(None),
            };

            match self
                .recipe_repo
                .create(
                    model,
                    self.ingredient_rows(&recipe_id, &input.ingredients)?,
                    self.tag_rows(&recipe_id, &input.tags),
                )
                .await
            {
                Ok(created) => break created,
                Err(AppError::Conflict(_)) if attempt < SHORT_CODE_ATTEMPTS => {
                    tracing::warn!(recipe_id = %recipe_id, attempt, "Short code collision, retrying");
                }
                Err(e) => return Err(e),
            }
        };

        tracing::info!(recipe_id = %created.id, author_id = %author.id, "Recipe created");

        self.view(created, Some(author.id.as_str())).await
    }

    /// Update a recipe. Only its author or an admin may do so.
    pub async fn update(
        &self,
        actor: &user::Model,
        recipe_id: &str,
        input: UpdateRecipeInput,
    ) -> AppResult<RecipeView> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;
        ensure_can_modify(actor, &recipe)?;

        recipe_validator::validate_update(&input, &self.limits)?;
        if let Some(ingredients) = &input.ingredients {
            self.ensure_ingredients_exist(ingredients).await?;
        }
        if let Some(tags) = &input.tags {
            self.ensure_tags_exist(tags).await?;
        }

        let ingredients = input
            .ingredients
            .as_deref()
            .map(|items| self.ingredient_rows(recipe_id, items))
            .transpose()?;
        let tags = input.tags.as_deref().map(|items| self.tag_rows(recipe_id, items));

        let mut model: recipe::ActiveModel = recipe.into();
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(image) = input.image {
            model.image = Set(image);
        }
        if let Some(text) = input.text {
            model.text = Set(text);
        }
        if let Some(cooking_time) = input.cooking_time {
            model.cooking_time = Set(recipe_validator::narrow(cooking_time, "cooking_time")?);
        }
        model.updated_at = Set(Some(Utc::now().into()));

        let updated = self.recipe_repo.update(model, ingredients, tags).await?;

        tracing::info!(recipe_id = %updated.id, actor_id = %actor.id, "Recipe updated");

        self.view(updated, Some(actor.id.as_str())).await
    }

    /// Delete a recipe. Only its author or an admin may do so.
    pub async fn delete(&self, actor: &user::Model, recipe_id: &str) -> AppResult<()> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;
        ensure_can_modify(actor, &recipe)?;

        self.recipe_repo.delete(&recipe.id).await?;

        tracing::info!(recipe_id = %recipe.id, actor_id = %actor.id, "Recipe deleted");
        Ok(())
    }

    /// Get a recipe as seen by `viewer`.
    pub async fn get(&self, recipe_id: &str, viewer: Option<&str>) -> AppResult<RecipeView> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;
        self.view(recipe, viewer).await
    }

    /// List recipes, newest first.
    ///
    /// The favorited and in-cart flags only filter for an authenticated viewer.
    pub async fn list(
        &self,
        query: RecipeQuery,
        page: PageRequest,
        viewer: Option<&str>,
    ) -> AppResult<Listing<RecipeView>> {
        let filter = RecipeFilter {
            tag_slugs: query.tags,
            author_id: query.author,
            favorited_by: viewer
                .filter(|_| query.is_favorited)
                .map(ToString::to_string),
            in_cart_of: viewer
                .filter(|_| query.is_in_shopping_cart)
                .map(ToString::to_string),
        };

        let count = self.recipe_repo.count(&filter).await?;
        let recipes = self
            .recipe_repo
            .search(&filter, page.limit, page.offset())
            .await?;

        Ok(Listing::new(count, self.hydrate(recipes, viewer).await?))
    }

    /// Shareable link for a recipe.
    pub async fn short_link(&self, recipe_id: &str) -> AppResult<String> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;
        Ok(format!("{}/s/{}", self.server_url, recipe.short_code))
    }

    /// Resolve a short code to its recipe ID.
    pub async fn resolve_short_code(&self, code: &str) -> AppResult<String> {
        self.recipe_repo
            .find_by_short_code(code)
            .await?
            .map(|r| r.id)
            .ok_or_else(|| AppError::NotFound(format!("Short link {code}")))
    }

    async fn view(&self, recipe: recipe::Model, viewer: Option<&str>) -> AppResult<RecipeView> {
        let id = recipe.id.clone();
        self.hydrate(vec![recipe], viewer)
            .await?
            .pop()
            .ok_or(AppError::RecipeNotFound(id))
    }

    /// Build full views for a page of recipes with a fixed number of queries.
    async fn hydrate(
        &self,
        recipes: Vec<recipe::Model>,
        viewer: Option<&str>,
    ) -> AppResult<Vec<RecipeView>> {
        if recipes.is_empty() {
            return Ok(vec![]);
        }

        let recipe_ids: Vec<String> = recipes.iter().map(|r| r.id.clone()).collect();
        let author_ids: Vec<String> = recipes
            .iter()
            .map(|r| r.author_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let mut ingredients: HashMap<String, Vec<RecipeIngredientView>> = HashMap::new();
        for row in self.recipe_repo.ingredient_rows(&recipe_ids).await? {
            ingredients
                .entry(row.recipe_id.clone())
                .or_default()
                .push(row.into());
        }

        let mut tags: HashMap<String, Vec<TagView>> = HashMap::new();
        for row in self.recipe_repo.tag_rows(&recipe_ids).await? {
            tags.entry(row.recipe_id.clone()).or_default().push(row.into());
        }

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let (favorited, in_cart, following) = match viewer {
            Some(viewer_id) => (
                self.favorite_repo
                    .favorited_among(viewer_id, &recipe_ids)
                    .await?,
                self.cart_repo.in_cart_among(viewer_id, &recipe_ids).await?,
                self.follow_repo
                    .following_among(viewer_id, &author_ids)
                    .await?,
            ),
            None => Default::default(),
        };

        recipes
            .into_iter()
            .map(|recipe| {
                let author = authors
                    .get(&recipe.author_id)
                    .ok_or_else(|| AppError::UserNotFound(recipe.author_id.clone()))?;

                Ok(RecipeView {
                    tags: tags.remove(&recipe.id).unwrap_or_default(),
                    author: UserView::new(author, following.contains(&author.id)),
                    ingredients: ingredients.remove(&recipe.id).unwrap_or_default(),
                    is_favorited: favorited.contains(&recipe.id),
                    is_in_shopping_cart: in_cart.contains(&recipe.id),
                    id: recipe.id,
                    name: recipe.name,
                    image: recipe.image,
                    text: recipe.text,
                    cooking_time: recipe.cooking_time,
                })
            })
            .collect()
    }

    async fn ensure_ingredients_exist(&self, items: &[RecipeIngredientInput]) -> AppResult<()> {
        let ids: Vec<String> = items.iter().map(|i| i.id.clone()).collect();
        let found = self.ingredient_repo.find_by_ids(&ids).await?;
        if found.len() == ids.len() {
            Ok(())
        } else {
            Err(AppError::validation("ingredients", reason::NOT_FOUND))
        }
    }

    async fn ensure_tags_exist(&self, ids: &[String]) -> AppResult<()> {
        let found = self.tag_repo.find_by_ids(ids).await?;
        if found.len() == ids.len() {
            Ok(())
        } else {
            Err(AppError::validation("tags", reason::NOT_FOUND))
        }
    }

    fn ingredient_rows(
        &self,
        recipe_id: &str,
        items: &[RecipeIngredientInput],
    ) -> AppResult<Vec<recipe_ingredient::ActiveModel>> {
        items
            .iter()
            .map(|item| {
                Ok(recipe_ingredient::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    recipe_id: Set(recipe_id.to_string()),
                    ingredient_id: Set(item.id.clone()),
                    amount: Set(recipe_validator::narrow(item.amount, "ingredients")?),
                })
            })
            .collect()
    }

    fn tag_rows(&self, recipe_id: &str, tag_ids: &[String]) -> Vec<recipe_tag::ActiveModel> {
        tag_ids
            .iter()
            .map(|tag_id| recipe_tag::ActiveModel {
                id: Set(self.id_gen.generate()),
                recipe_id: Set(recipe_id.to_string()),
                tag_id: Set(tag_id.clone()),
            })
            .collect()
    }
}

fn ensure_can_modify(actor: &user::Model, recipe: &recipe::Model) -> AppResult<()> {
    if actor.is_admin || actor.id == recipe.author_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the author can modify this recipe".to_string(),
        ))
    }
}
