//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `foodgram_test`)
//!   `TEST_DB_PASSWORD` (default: `foodgram_test`)
//!   `TEST_DB_NAME` (default: `foodgram_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use foodgram_db::entities::{favorite, ingredient, recipe, recipe_ingredient, recipe_tag, tag, user};
use foodgram_db::repositories::{
    FavoriteRepository, IngredientRepository, RecipeRepository, ShoppingCartRepository,
    TagRepository, UserRepository,
};
use foodgram_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::{Database, DatabaseConnection, Set};

async fn seed_user(db: &Arc<DatabaseConnection>, id: &str) -> user::Model {
    UserRepository::new(Arc::clone(db))
        .create(user::ActiveModel {
            id: Set(id.to_string()),
            email: Set(format!("{id}@example.com")),
            username: Set(id.to_string()),
            first_name: Set("Test".to_string()),
            last_name: Set("Cook".to_string()),
            avatar: Set(None),
            password: Set("hash".to_string()),
            token: Set(None),
            is_admin: Set(false),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        })
        .await
        .unwrap()
}

async fn seed_ingredient(db: &Arc<DatabaseConnection>, id: &str, name: &str, unit: &str) {
    IngredientRepository::new(Arc::clone(db))
        .insert_if_absent(ingredient::ActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
            measurement_unit: Set(unit.to_string()),
        })
        .await
        .unwrap();
}

async fn seed_tag(db: &Arc<DatabaseConnection>, id: &str) {
    TagRepository::new(Arc::clone(db))
        .create(tag::ActiveModel {
            id: Set(id.to_string()),
            name: Set(id.to_string()),
            color: Set(format!("#{:0>6}", id.len())),
            slug: Set(id.to_string()),
        })
        .await
        .unwrap();
}

async fn seed_recipe(
    db: &Arc<DatabaseConnection>,
    id: &str,
    author_id: &str,
    ingredients: &[(&str, i32)],
    tag_id: &str,
) -> recipe::Model {
    let rows = ingredients
        .iter()
        .map(|(ingredient_id, amount)| recipe_ingredient::ActiveModel {
            id: Set(format!("{id}-{ingredient_id}")),
            recipe_id: Set(id.to_string()),
            ingredient_id: Set((*ingredient_id).to_string()),
            amount: Set(*amount),
        })
        .collect();

    RecipeRepository::new(Arc::clone(db))
        .create(
            recipe::ActiveModel {
                id: Set(id.to_string()),
                author_id: Set(author_id.to_string()),
                name: Set(id.to_string()),
                image: Set("recipes/images/x.png".to_string()),
                text: Set("Cook it.".to_string()),
                cooking_time: Set(10),
                short_code: Set(format!("{id:0>8}")),
                created_at: Set(Utc::now().into()),
                updated_at: Set(None),
            },
            rows,
            vec![recipe_tag::ActiveModel {
                id: Set(format!("{id}-{tag_id}")),
                recipe_id: Set(id.to_string()),
                tag_id: Set(tag_id.to_string()),
            }],
        )
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_cart_ingredient_rows_cover_every_cart_recipe() {
    let test_db = TestDatabase::create_unique().await.unwrap();
    let db = Arc::new(Database::connect(test_db.config.database_url()).await.unwrap());

    seed_user(&db, "cook").await;
    seed_ingredient(&db, "flour", "flour", "g").await;
    seed_ingredient(&db, "eggs", "eggs", "pcs").await;
    seed_tag(&db, "bake").await;
    seed_recipe(&db, "a", "cook", &[("flour", 200), ("eggs", 2)], "bake").await;
    seed_recipe(&db, "b", "cook", &[("flour", 300), ("eggs", 1)], "bake").await;

    let cart = ShoppingCartRepository::new(Arc::clone(&db));
    for recipe_id in ["a", "b"] {
        let added = cart
            .insert_if_absent(foodgram_db::entities::shopping_cart::ActiveModel {
                id: Set(format!("cart-{recipe_id}")),
                user_id: Set("cook".to_string()),
                recipe_id: Set(recipe_id.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap();
        assert!(added);
    }

    let mut rows = cart.ingredient_rows("cook").await.unwrap();
    rows.sort_by(|a, b| (&a.name, a.amount).cmp(&(&b.name, b.amount)));

    let amounts: Vec<(String, i32)> = rows.into_iter().map(|r| (r.name, r.amount)).collect();
    assert_eq!(
        amounts,
        vec![
            ("eggs".to_string(), 1),
            ("eggs".to_string(), 2),
            ("flour".to_string(), 200),
            ("flour".to_string(), 300),
        ]
    );

    test_db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_concurrent_duplicate_favorite_stores_one_edge() {
    let test_db = TestDatabase::create_unique().await.unwrap();
    let db = Arc::new(Database::connect(test_db.config.database_url()).await.unwrap());

    seed_user(&db, "cook").await;
    seed_ingredient(&db, "flour", "flour", "g").await;
    seed_tag(&db, "bake").await;
    seed_recipe(&db, "a", "cook", &[("flour", 200)], "bake").await;

    let tasks: Vec<_> = (0..8)
        .map(|n| {
            let repo = FavoriteRepository::new(Arc::clone(&db));
            tokio::spawn(async move {
                repo.insert_if_absent(favorite::ActiveModel {
                    id: Set(format!("fav-{n}")),
                    user_id: Set("cook".to_string()),
                    recipe_id: Set("a".to_string()),
                    created_at: Set(Utc::now().into()),
                })
                .await
                .unwrap()
            })
        })
        .collect();

    let mut created = 0;
    for task in tasks {
        if task.await.unwrap() {
            created += 1;
        }
    }

    let favorites = FavoriteRepository::new(Arc::clone(&db));
    assert_eq!(created, 1);
    assert_eq!(favorites.count_by_user("cook").await.unwrap(), 1);

    test_db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_recipe_delete_cascades_to_edges() {
    let test_db = TestDatabase::create_unique().await.unwrap();
    let db = Arc::new(Database::connect(test_db.config.database_url()).await.unwrap());

    seed_user(&db, "cook").await;
    seed_ingredient(&db, "flour", "flour", "g").await;
    seed_tag(&db, "bake").await;
    seed_recipe(&db, "a", "cook", &[("flour", 200)], "bake").await;

    let favorites = FavoriteRepository::new(Arc::clone(&db));
    favorites
        .insert_if_absent(favorite::ActiveModel {
            id: Set("fav".to_string()),
            user_id: Set("cook".to_string()),
            recipe_id: Set("a".to_string()),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();

    let recipes = RecipeRepository::new(Arc::clone(&db));
    assert!(recipes.delete("a").await.unwrap());

    assert_eq!(favorites.count_by_user("cook").await.unwrap(), 0);
    assert!(recipes.ingredient_rows(&["a".to_string()]).await.unwrap().is_empty());
    assert!(recipes.tag_rows(&["a".to_string()]).await.unwrap().is_empty());

    test_db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    let url = config.postgres_url();
    assert!(url.ends_with("/postgres"));
}
