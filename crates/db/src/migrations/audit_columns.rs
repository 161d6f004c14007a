//! Audit columns shared by every table.

use sea_orm_migration::prelude::*;

#[derive(Iden)]
enum Audit {
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
    IsDeleted,
    DeletedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

/// Append the audit columns to a table definition.
pub fn add_columns(table: &mut TableCreateStatement) {
    table
        .col(
            ColumnDef::new(Audit::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Audit::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(ColumnDef::new(Audit::CreatedBy).string_len(32))
        .col(ColumnDef::new(Audit::UpdatedBy).string_len(32))
        .col(ColumnDef::new(Audit::IsDeleted).boolean().not_null().default(false))
        .col(ColumnDef::new(Audit::DeletedAt).timestamp_with_time_zone());
}

/// Create the actor foreign keys and the soft-delete index for `table`.
///
/// Actor references are weak: removing a user nulls them instead of
/// cascading into the audited row.
pub async fn add_constraints(manager: &SchemaManager<'_>, table: &str) -> Result<(), DbErr> {
    let table_iden = Alias::new(table);

    for (column, name) in [
        (Audit::CreatedBy, format!("fk_{table}_created_by")),
        (Audit::UpdatedBy, format!("fk_{table}_updated_by")),
    ] {
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name(name)
                    .from(table_iden.clone(), column)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;
    }

    // Index: is_deleted (default-scoped reads)
    manager
        .create_index(
            Index::create()
                .name(format!("idx_{table}_is_deleted"))
                .table(table_iden)
                .col(Audit::IsDeleted)
                .to_owned(),
        )
        .await
}
