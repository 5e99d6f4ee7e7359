//! Business logic services.

#![allow(missing_docs)]

pub mod favorite;
pub mod following;
pub mod ingredient;
pub mod projection;
pub mod recipe;
pub mod recipe_validator;
pub mod shopping_cart;
pub mod shopping_list;
pub mod tag;
pub mod toggle;
pub mod user;

pub use favorite::FavoriteService;
pub use following::FollowingService;
pub use ingredient::{ImportReport, IngredientSeed, IngredientService, IngredientView};
pub use projection::{
    Listing, PageRequest, RecipeIngredientView, RecipeSummary, RecipeView, RegisteredUser,
    Subscription, TagView, UserView,
};
pub use recipe::{
    CreateRecipeInput, RecipeIngredientInput, RecipeQuery, RecipeService, UpdateRecipeInput,
};
pub use shopping_cart::ShoppingCartService;
pub use shopping_list::{
    EMPTY_SHOPPING_LIST, SHOPPING_LIST_FILENAME, ShoppingListLine, ShoppingListService,
};
pub use tag::TagService;
pub use user::{CreateUserInput, SetPasswordInput, UserService};
