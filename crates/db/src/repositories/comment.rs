//! Comment repository.

use std::sync::Arc;

use crate::entities::{Comment, comment};
use crate::repositories::scope::{self, Scope};
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID within a scope.
    pub async fn find_by_id(&self, id: &str, scope: Scope) -> AppResult<Option<comment::Model>> {
        scope::find_by_id::<Comment, _>(self.db.as_ref(), id, scope).await
    }

    /// Find an active comment by ID, returning an error if not found.
    pub async fn get_active_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id, Scope::Active)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {id}")))
    }

    /// Look up a prospective parent in the active view and share-lock it.
    ///
    /// Not restricted to one post; the caller compares `post_id` itself.
    pub async fn lock_active_parent<C: ConnectionTrait>(
        conn: &C,
        parent_id: &str,
    ) -> AppResult<Option<comment::Model>> {
        scope::lock_by_id::<Comment, _>(conn, parent_id, Scope::Active, false).await
    }

    /// Insert a comment on the given connection or transaction.
    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        model: comment::ActiveModel,
    ) -> AppResult<comment::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count root comments of a post.
    pub async fn count_roots(&self, post_id: &str, scope: Scope) -> AppResult<u64> {
        scope
            .apply(Comment::find())
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::ParentId.is_null())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Page of root comments of a post, oldest first.
    pub async fn find_roots(
        &self,
        post_id: &str,
        scope: Scope,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<comment::Model>> {
        scope
            .apply(Comment::find())
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::ParentId.is_null())
            .order_by_asc(comment::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active replies under the given roots at every depth, oldest first.
    ///
    /// One recursive query; a reply under a deleted comment is not reached.
    /// Callers assemble the tree.
    pub async fn find_descendants(&self, root_ids: &[String]) -> AppResult<Vec<comment::Model>> {
        if root_ids.is_empty() {
            return Ok(Vec::new());
        }

        Comment::find()
            .from_raw_sql(descendants_statement(root_ids))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List comments ordered by ID.
    pub async fn list(
        &self,
        scope: Scope,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<comment::Model>> {
        scope::list::<Comment, _>(self.db.as_ref(), scope, limit, offset).await
    }

    /// Count comments within a scope.
    pub async fn count(&self, scope: Scope) -> AppResult<u64> {
        scope::count::<Comment, _>(self.db.as_ref(), scope).await
    }
}

fn descendants_statement(root_ids: &[String]) -> Statement {
    let placeholders = (1..=root_ids.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        r#"WITH RECURSIVE "thread" AS (
    SELECT "c".* FROM "comment" AS "c"
    WHERE "c"."parent_id" IN ({placeholders}) AND "c"."is_deleted" = FALSE
  UNION ALL
    SELECT "c".* FROM "comment" AS "c"
    INNER JOIN "thread" AS "t" ON "c"."parent_id" = "t"."id"
    WHERE "c"."is_deleted" = FALSE
)
SELECT * FROM "thread" ORDER BY "id""#
    );

    Statement::from_sql_and_values(
        DbBackend::Postgres,
        sql,
        root_ids.iter().map(|id| id.as_str().into()),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait};

    fn create_test_comment(id: &str, parent_id: Option<&str>, depth: i16) -> comment::Model {
        let now = Utc::now().into();
        comment::Model {
            id: id.to_string(),
            post_id: "post1".to_string(),
            author_id: "user1".to_string(),
            content: format!("comment {id}"),
            parent_id: parent_id.map(ToString::to_string),
            depth,
            created_at: now,
            updated_at: now,
            created_by: Some("user1".to_string()),
            updated_by: None,
            is_deleted: false,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_descendants_returns_flat_replies() {
        let b = create_test_comment("b", Some("a"), 1);
        let c = create_test_comment("c", Some("b"), 2);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[b.clone(), c.clone()]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let replies = repo.find_descendants(&["a".to_string()]).await.unwrap();

        assert_eq!(replies, vec![b, c]);
    }

    #[tokio::test]
    async fn test_find_descendants_without_roots_skips_query() {
        let repo = CommentRepository::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));

        assert!(repo.find_descendants(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_descendants_start_from_page_roots_only() {
        let roots = vec!["a".to_string(), "d".to_string()];
        let stmt = descendants_statement(&roots);

        assert!(stmt.sql.starts_with("WITH RECURSIVE"));
        assert!(stmt.sql.contains(r#""c"."parent_id" IN ($1, $2)"#));
        assert!(!stmt.sql.contains("post_id"));
        assert_eq!(stmt.values.unwrap().0.len(), 2);
    }

    #[test]
    fn test_root_query_shape() {
        let sql = Scope::Active
            .apply(Comment::find())
            .filter(comment::Column::PostId.eq("post1"))
            .filter(comment::Column::ParentId.is_null())
            .order_by_asc(comment::Column::Id)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""comment"."parent_id" IS NULL"#));
        assert!(sql.contains(r#""comment"."is_deleted" = FALSE"#));
        assert!(sql.ends_with(r#"ORDER BY "comment"."id" ASC"#));
    }

    #[tokio::test]
    async fn test_lock_active_parent_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<comment::Model>::new()])
            .into_connection();

        let parent = CommentRepository::lock_active_parent(&db, "gone")
            .await
            .unwrap();

        assert!(parent.is_none());
    }

    #[tokio::test]
    async fn test_count_roots() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(12))
                }]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let total = repo.count_roots("post1", Scope::Active).await.unwrap();

        assert_eq!(total, 12);
    }
}
