//! Write-side rules of the comment hierarchy.
//!
//! A comment's parent is chosen once, at creation, and never changes, so its
//! depth is fixed when it is inserted. The parent is read under a shared row
//! lock in the same transaction as the insert; a concurrent soft delete of
//! the parent waits for the insert to commit.

use std::sync::Arc;

use quill_common::{AppError, AppResult, ClockService, IdGenerator};
use quill_db::entities::{comment, post};
use quill_db::repositories::{self, CommentRepository, PostRepository};
use sea_orm::{DatabaseConnection, Set};

/// Depth of a new comment under `parent`, or why it cannot be attached.
///
/// `max_depth` counts levels from the root, so the deepest allowed comment
/// has depth `max_depth - 1`.
pub fn compute_depth(
    post_id: &str,
    parent: Option<&comment::Model>,
    max_depth: i16,
) -> AppResult<i16> {
    let Some(parent) = parent else {
        return Ok(0);
    };

    if parent.post_id != post_id {
        return Err(AppError::CrossPostParent {
            parent_id: parent.id.clone(),
        });
    }

    if parent.depth >= max_depth - 1 {
        return Err(AppError::DepthExceeded { max_depth });
    }

    Ok(parent.depth + 1)
}

/// Validates parent linkage and persists new comments.
#[derive(Clone)]
pub struct CommentTree {
    db: Arc<DatabaseConnection>,
    clock: ClockService,
    id_gen: IdGenerator,
    max_depth: i16,
}

impl CommentTree {
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>, clock: ClockService, max_depth: i16) -> Self {
        Self {
            db,
            clock,
            id_gen: IdGenerator::new(),
            max_depth,
        }
    }

    #[must_use]
    pub const fn max_depth(&self) -> i16 {
        self.max_depth
    }

    /// Attach a new comment to `post`, optionally under `parent_id`.
    ///
    /// The parent must be an active comment of the same post whose depth
    /// leaves room for one more level.
    pub async fn validate_and_attach(
        &self,
        content: String,
        author_id: &str,
        post: &post::Model,
        parent_id: Option<&str>,
    ) -> AppResult<comment::Model> {
        let txn = repositories::begin(&self.db).await?;

        PostRepository::lock_active(&txn, &post.id).await?;

        let parent = match parent_id {
            Some(parent_id) => Some(
                CommentRepository::lock_active_parent(&txn, parent_id)
                    .await?
                    .ok_or_else(|| AppError::ParentNotFound(parent_id.to_string()))?,
            ),
            None => None,
        };

        let depth = match compute_depth(&post.id, parent.as_ref(), self.max_depth) {
            Ok(depth) => depth,
            Err(e) => {
                tracing::debug!(post_id = %post.id, parent_id = ?parent_id, error = %e, "Comment rejected");
                return Err(e);
            }
        };

        let now = self.clock.now_fixed();
        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id.clone()),
            author_id: Set(author_id.to_string()),
            content: Set(content),
            parent_id: Set(parent.map(|p| p.id)),
            depth: Set(depth),
            created_at: Set(now),
            updated_at: Set(now),
            created_by: Set(Some(author_id.to_string())),
            updated_by: Set(Some(author_id.to_string())),
            is_deleted: Set(false),
            deleted_at: Set(None),
        };

        let comment = CommentRepository::insert(&txn, model).await?;
        repositories::commit(txn).await?;

        tracing::info!(
            comment_id = %comment.id,
            post_id = %comment.post_id,
            depth = comment.depth,
            "Comment created"
        );

        Ok(comment)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use quill_common::FixedClock;
    use quill_db::entities::post::PostStatus;
    use sea_orm::{DatabaseBackend, MockDatabase};

    const MAX_DEPTH: i16 = 3;

    fn create_test_post(id: &str) -> post::Model {
        let now = Utc::now().into();
        post::Model {
            id: id.to_string(),
            title: "Post".to_string(),
            slug: format!("post-{id}"),
            content: "body".to_string(),
            author_id: "author".to_string(),
            status: PostStatus::Published,
            category_id: None,
            created_at: now,
            updated_at: now,
            created_by: Some("author".to_string()),
            updated_by: None,
            is_deleted: false,
            deleted_at: None,
        }
    }

    fn create_test_comment(id: &str, post_id: &str, parent_id: Option<&str>, depth: i16) -> comment::Model {
        let now = Utc::now().into();
        comment::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            author_id: "reader".to_string(),
            content: format!("comment {id}"),
            parent_id: parent_id.map(ToString::to_string),
            depth,
            created_at: now,
            updated_at: now,
            created_by: Some("reader".to_string()),
            updated_by: None,
            is_deleted: false,
            deleted_at: None,
        }
    }

    fn clock() -> ClockService {
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()))
    }

    #[test]
    fn test_root_comment_has_depth_zero() {
        assert_eq!(compute_depth("post1", None, MAX_DEPTH).unwrap(), 0);
    }

    #[test]
    fn test_child_depth_is_parent_plus_one() {
        let root = create_test_comment("r", "post1", None, 0);
        let child = create_test_comment("c", "post1", Some("r"), 1);

        assert_eq!(compute_depth("post1", Some(&root), MAX_DEPTH).unwrap(), 1);
        assert_eq!(compute_depth("post1", Some(&child), MAX_DEPTH).unwrap(), 2);
    }

    #[test]
    fn test_parent_at_last_level_is_rejected() {
        let deepest = create_test_comment("d", "post1", Some("c"), MAX_DEPTH - 1);

        let result = compute_depth("post1", Some(&deepest), MAX_DEPTH);

        assert!(matches!(result, Err(AppError::DepthExceeded { max_depth: 3 })));
    }

    #[test]
    fn test_parent_from_other_post_is_rejected() {
        let foreign = create_test_comment("f", "post2", None, 0);

        let result = compute_depth("post1", Some(&foreign), MAX_DEPTH);

        match result {
            Err(AppError::CrossPostParent { parent_id }) => assert_eq!(parent_id, "f"),
            other => panic!("Expected CrossPostParent, got {other:?}"),
        }
    }

    #[test]
    fn test_depth_never_reaches_max() {
        for max_depth in 1..=6 {
            let mut parent: Option<comment::Model> = None;
            let mut depths = Vec::new();
            while let Ok(depth) = compute_depth("post1", parent.as_ref(), max_depth) {
                depths.push(depth);
                parent = Some(create_test_comment("p", "post1", None, depth));
            }
            assert_eq!(depths.len(), usize::try_from(max_depth).unwrap());
            assert!(depths.iter().all(|d| *d < max_depth));
        }
    }

    #[tokio::test]
    async fn test_chain_scenario_fails_at_fourth_level() {
        let post = create_test_post("post1");
        let r = create_test_comment("r", "post1", None, 0);
        let a = create_test_comment("a", "post1", Some("r"), 1);
        let b = create_test_comment("b", "post1", Some("a"), 2);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // reply to r
                .append_query_results([[post.clone()]])
                .append_query_results([[r.clone()]])
                .append_query_results([[a.clone()]])
                // reply to a
                .append_query_results([[post.clone()]])
                .append_query_results([[a.clone()]])
                .append_query_results([[b.clone()]])
                // reply to b
                .append_query_results([[post.clone()]])
                .append_query_results([[b.clone()]])
                .into_connection(),
        );

        let tree = CommentTree::new(db, clock(), MAX_DEPTH);

        let first = tree
            .validate_and_attach("one".to_string(), "reader", &post, Some("r"))
            .await
            .unwrap();
        assert_eq!(first.depth, 1);

        let second = tree
            .validate_and_attach("two".to_string(), "reader", &post, Some("a"))
            .await
            .unwrap();
        assert_eq!(second.depth, 2);

        let third = tree
            .validate_and_attach("three".to_string(), "reader", &post, Some("b"))
            .await;
        assert!(matches!(third, Err(AppError::DepthExceeded { .. })));
    }

    #[tokio::test]
    async fn test_missing_parent_is_parent_not_found() {
        let post = create_test_post("post1");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .append_query_results([Vec::<comment::Model>::new()])
                .into_connection(),
        );

        let tree = CommentTree::new(db, clock(), MAX_DEPTH);
        let result = tree
            .validate_and_attach("hi".to_string(), "reader", &post, Some("gone"))
            .await;

        match result {
            Err(AppError::ParentNotFound(id)) => assert_eq!(id, "gone"),
            other => panic!("Expected ParentNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_root_comment_persists_with_author_attribution() {
        let post = create_test_post("post1");
        let stored = create_test_comment("new", "post1", None, 0);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .append_query_results([[stored.clone()]])
                .into_connection(),
        );

        let tree = CommentTree::new(db, clock(), MAX_DEPTH);
        let comment = tree
            .validate_and_attach("hi".to_string(), "reader", &post, None)
            .await
            .unwrap();

        assert_eq!(comment.depth, 0);
        assert!(comment.is_root());
        assert_eq!(comment.created_by.as_deref(), Some("reader"));
    }
}
