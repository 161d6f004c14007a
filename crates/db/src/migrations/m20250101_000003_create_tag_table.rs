//! Create tag table migration.

use sea_orm_migration::prelude::*;

use super::audit_columns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create()
            .table(Tag::Table)
            .if_not_exists()
            .col(ColumnDef::new(Tag::Id).string_len(32).not_null().primary_key())
            .col(ColumnDef::new(Tag::Name).string_len(50).not_null().unique_key())
            .col(ColumnDef::new(Tag::Slug).string_len(60).not_null().unique_key())
            .to_owned();
        audit_columns::add_columns(&mut table);

        manager.create_table(table).await?;

        audit_columns::add_constraints(manager, "tag").await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tag::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Tag {
    Table,
    Id,
    Name,
    Slug,
}
