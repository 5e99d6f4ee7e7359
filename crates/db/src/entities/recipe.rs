//! Recipe entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub author_id: String,

    pub name: String,

    /// Opaque image reference
    #[sea_orm(column_type = "Text")]
    pub image: String,

    #[sea_orm(column_type = "Text")]
    pub text: String,

    /// Minutes
    pub cooking_time: i32,

    /// Code used by shareable links
    #[sea_orm(unique)]
    pub short_code: String,

    /// Publication time
    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,

    #[sea_orm(has_many = "super::recipe_ingredient::Entity")]
    RecipeIngredients,

    #[sea_orm(has_many = "super::recipe_tag::Entity")]
    RecipeTags,

    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorites,

    #[sea_orm(has_many = "super::shopping_cart::Entity")]
    ShoppingCart,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::recipe_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeIngredients.def()
    }
}

impl Related<super::recipe_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeTags.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl Related<super::shopping_cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShoppingCart.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
