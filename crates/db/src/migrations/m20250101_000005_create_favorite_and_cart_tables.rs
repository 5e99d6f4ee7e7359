//! Create favorite and shopping_cart tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_edge_table(manager, Edge::Favorite, "favorite").await?;
        create_edge_table(manager, Edge::ShoppingCart, "shopping_cart").await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Edge::ShoppingCart).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Edge::Favorite).to_owned())
            .await
    }
}

/// Both tables share the same (user, recipe) shape.
async fn create_edge_table(
    manager: &SchemaManager<'_>,
    table: Edge,
    prefix: &str,
) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(table)
                .if_not_exists()
                .col(ColumnDef::new(Edge::Id).string_len(32).not_null().primary_key())
                .col(ColumnDef::new(Edge::UserId).string_len(32).not_null())
                .col(ColumnDef::new(Edge::RecipeId).string_len(32).not_null())
                .col(
                    ColumnDef::new(Edge::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp()),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name(format!("fk_{prefix}_user"))
                        .from(table, Edge::UserId)
                        .to(User::Table, User::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name(format!("fk_{prefix}_recipe"))
                        .from(table, Edge::RecipeId)
                        .to(Recipe::Table, Recipe::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

    // Unique index: (user_id, recipe_id) - edges are sets
    manager
        .create_index(
            Index::create()
                .name(format!("idx_{prefix}_user_recipe"))
                .table(table)
                .col(Edge::UserId)
                .col(Edge::RecipeId)
                .unique()
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name(format!("idx_{prefix}_recipe_id"))
                .table(table)
                .col(Edge::RecipeId)
                .to_owned(),
        )
        .await
}

#[derive(Iden, Clone, Copy)]
enum Edge {
    Favorite,
    ShoppingCart,
    Id,
    UserId,
    RecipeId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Recipe {
    Table,
    Id,
}
