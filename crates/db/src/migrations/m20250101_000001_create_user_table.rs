//! Create user table migration.

use sea_orm_migration::prelude::*;

use super::audit_columns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create()
            .table(User::Table)
            .if_not_exists()
            .col(ColumnDef::new(User::Id).string_len(32).not_null().primary_key())
            .col(ColumnDef::new(User::Username).string_len(150).not_null().unique_key())
            .col(ColumnDef::new(User::Email).string_len(254).not_null().unique_key())
            .col(ColumnDef::new(User::PasswordHash).string_len(256).not_null())
            .col(ColumnDef::new(User::Token).string_len(64).not_null().unique_key())
            .col(ColumnDef::new(User::IsActive).boolean().not_null().default(true))
            .col(ColumnDef::new(User::IsStaff).boolean().not_null().default(false))
            .col(ColumnDef::new(User::IsSuperuser).boolean().not_null().default(false))
            .to_owned();
        audit_columns::add_columns(&mut table);

        manager.create_table(table).await?;

        audit_columns::add_constraints(manager, "user").await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Token,
    IsActive,
    IsStaff,
    IsSuperuser,
}
