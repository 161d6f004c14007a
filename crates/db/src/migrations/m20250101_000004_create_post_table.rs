//! Create post table migration.

use sea_orm_migration::prelude::*;

use super::audit_columns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create()
            .table(Post::Table)
            .if_not_exists()
            .col(ColumnDef::new(Post::Id).string_len(32).not_null().primary_key())
            .col(ColumnDef::new(Post::Title).string_len(50).not_null())
            .col(ColumnDef::new(Post::Slug).string_len(50).not_null().unique_key())
            .col(ColumnDef::new(Post::Content).text().not_null())
            .col(ColumnDef::new(Post::AuthorId).string_len(32).not_null())
            .col(ColumnDef::new(Post::Status).string_len(10).not_null().default("draft"))
            .col(ColumnDef::new(Post::CategoryId).string_len(32))
            .to_owned();
        audit_columns::add_columns(&mut table);

        manager.create_table(table).await?;

        // Index: status (published listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_status")
                    .table(Post::Table)
                    .col(Post::Status)
                    .to_owned(),
            )
            .await?;

        // Index: author_id
        manager
            .create_index(
                Index::create()
                    .name("idx_post_author_id")
                    .table(Post::Table)
                    .col(Post::AuthorId)
                    .to_owned(),
            )
            .await?;

        // Foreign key: author_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_post_author_id")
                    .from(Post::Table, Post::AuthorId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Foreign key: category_id -> category.id (posts outlive their category)
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_post_category_id")
                    .from(Post::Table, Post::CategoryId)
                    .to(Category::Table, Category::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;

        audit_columns::add_constraints(manager, "post").await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
    Title,
    Slug,
    Content,
    AuthorId,
    Status,
    CategoryId,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
}
