//! Create recipe, recipe_ingredient and recipe_tag tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Recipe::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Recipe::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Recipe::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Recipe::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Recipe::Image).text().not_null())
                    .col(ColumnDef::new(Recipe::Text).text().not_null())
                    .col(ColumnDef::new(Recipe::CookingTime).integer().not_null())
                    .col(ColumnDef::new(Recipe::ShortCode).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Recipe::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Recipe::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_author")
                            .from(Recipe::Table, Recipe::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_short_code")
                    .table(Recipe::Table)
                    .col(Recipe::ShortCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: author_id (for author filter and recipe counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_author_id")
                    .table(Recipe::Table)
                    .col(Recipe::AuthorId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (newest-first listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_created_at")
                    .table(Recipe::Table)
                    .col(Recipe::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecipeIngredient::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecipeIngredient::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RecipeIngredient::RecipeId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecipeIngredient::IngredientId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecipeIngredient::Amount).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_ingredient_recipe")
                            .from(RecipeIngredient::Table, RecipeIngredient::RecipeId)
                            .to(Recipe::Table, Recipe::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_ingredient_ingredient")
                            .from(RecipeIngredient::Table, RecipeIngredient::IngredientId)
                            .to(Ingredient::Table, Ingredient::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (recipe_id, ingredient_id) - an ingredient appears once per recipe
        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_ingredient_unique")
                    .table(RecipeIngredient::Table)
                    .col(RecipeIngredient::RecipeId)
                    .col(RecipeIngredient::IngredientId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecipeTag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RecipeTag::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(RecipeTag::RecipeId).string_len(32).not_null())
                    .col(ColumnDef::new(RecipeTag::TagId).string_len(32).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_tag_recipe")
                            .from(RecipeTag::Table, RecipeTag::RecipeId)
                            .to(Recipe::Table, Recipe::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_tag_tag")
                            .from(RecipeTag::Table, RecipeTag::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_tag_unique")
                    .table(RecipeTag::Table)
                    .col(RecipeTag::RecipeId)
                    .col(RecipeTag::TagId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: tag_id (for tag filter)
        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_tag_tag_id")
                    .table(RecipeTag::Table)
                    .col(RecipeTag::TagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RecipeTag::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(RecipeIngredient::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Recipe::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Recipe {
    Table,
    Id,
    AuthorId,
    Name,
    Image,
    Text,
    CookingTime,
    ShortCode,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum RecipeIngredient {
    Table,
    Id,
    RecipeId,
    IngredientId,
    Amount,
}

#[derive(Iden)]
enum RecipeTag {
    Table,
    Id,
    RecipeId,
    TagId,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Ingredient {
    Table,
    Id,
}

#[derive(Iden)]
enum Tag {
    Table,
    Id,
}
