//! Create comment table migration.

use sea_orm_migration::prelude::*;

use super::audit_columns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create()
            .table(Comment::Table)
            .if_not_exists()
            .col(ColumnDef::new(Comment::Id).string_len(32).not_null().primary_key())
            .col(ColumnDef::new(Comment::PostId).string_len(32).not_null())
            .col(ColumnDef::new(Comment::AuthorId).string_len(32).not_null())
            .col(ColumnDef::new(Comment::Content).text().not_null())
            .col(ColumnDef::new(Comment::ParentId).string_len(32))
            .col(ColumnDef::new(Comment::Depth).small_integer().not_null().default(0))
            .check(Expr::col(Comment::Depth).gte(0))
            .to_owned();
        audit_columns::add_columns(&mut table);

        manager.create_table(table).await?;

        // Composite index: (post_id, parent_id, id) for root pages and reply batches
        manager
            .create_index(
                Index::create()
                    .name("idx_comment_post_id_parent_id_id")
                    .table(Comment::Table)
                    .col(Comment::PostId)
                    .col(Comment::ParentId)
                    .col(Comment::Id)
                    .to_owned(),
            )
            .await?;

        // Index: parent_id
        manager
            .create_index(
                Index::create()
                    .name("idx_comment_parent_id")
                    .table(Comment::Table)
                    .col(Comment::ParentId)
                    .to_owned(),
            )
            .await?;

        // Foreign key: post_id -> post.id (comments are owned by their post)
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_comment_post_id")
                    .from(Comment::Table, Comment::PostId)
                    .to(Post::Table, Post::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Foreign key: author_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_comment_author_id")
                    .from(Comment::Table, Comment::AuthorId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Foreign key: parent_id -> comment.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_comment_parent_id")
                    .from(Comment::Table, Comment::ParentId)
                    .to(Comment::Table, Comment::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        audit_columns::add_constraints(manager, "comment").await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comment::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Comment {
    Table,
    Id,
    PostId,
    AuthorId,
    Content,
    ParentId,
    Depth,
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
