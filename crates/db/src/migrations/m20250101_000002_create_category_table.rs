//! Create category table migration.

use sea_orm_migration::prelude::*;

use super::audit_columns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create()
            .table(Category::Table)
            .if_not_exists()
            .col(ColumnDef::new(Category::Id).string_len(32).not_null().primary_key())
            .col(ColumnDef::new(Category::Name).string_len(100).not_null().unique_key())
            .col(ColumnDef::new(Category::Slug).string_len(120).not_null().unique_key())
            .to_owned();
        audit_columns::add_columns(&mut table);

        manager.create_table(table).await?;

        audit_columns::add_constraints(manager, "category").await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Category::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
    Name,
    Slug,
}
