//! Create ingredient and tag tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ingredient::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ingredient::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ingredient::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Ingredient::MeasurementUnit)
                            .string_len(64)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (name, measurement_unit)
        manager
            .create_index(
                Index::create()
                    .name("idx_ingredient_name_unit")
                    .table(Ingredient::Table)
                    .col(Ingredient::Name)
                    .col(Ingredient::MeasurementUnit)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tag::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Tag::Name).string_len(32).not_null())
                    .col(ColumnDef::new(Tag::Color).string_len(7).not_null())
                    .col(ColumnDef::new(Tag::Slug).string_len(32).not_null())
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_tag_name", Tag::Name),
            ("idx_tag_color", Tag::Color),
            ("idx_tag_slug", Tag::Slug),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Tag::Table)
                        .col(column)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tag::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Ingredient::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Ingredient {
    Table,
    Id,
    Name,
    MeasurementUnit,
}

#[derive(Iden)]
enum Tag {
    Table,
    Id,
    Name,
    Color,
    Slug,
}
