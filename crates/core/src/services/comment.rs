//! Comment service.

use std::sync::Arc;

use quill_common::{AppError, AppResult, BlogConfig, ClockService};
use quill_db::entities::{comment, post};
use quill_db::repositories::{CommentRepository, PostRepository, Scope};
use sea_orm::{DatabaseConnection, Set};
use serde::Deserialize;
use validator::Validate;

use super::comment_tree::CommentTree;
use super::comment_view::{CommentNode, CommentView};
use super::pagination::{Page, PageRequest};
use super::visibility::{Actor, VisibilityPolicy};

/// Input for creating a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 10000))]
    pub content: String,

    /// Comment being replied to.
    pub parent_id: Option<String>,
}

/// Input for editing a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentInput {
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    tree: CommentTree,
    view: CommentView,
    clock: ClockService,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, clock: ClockService, blog: &BlogConfig) -> Self {
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        Self {
            view: CommentView::new(comment_repo.clone(), blog),
            tree: CommentTree::new(Arc::clone(&db), Arc::clone(&clock), blog.max_comment_depth),
            post_repo: PostRepository::new(db),
            comment_repo,
            clock,
        }
    }

    /// Comment on `post` as `actor`, optionally replying to `parent_id`.
    pub async fn create(
        &self,
        post: &post::Model,
        actor: &Actor,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        VisibilityPolicy::ensure_can_comment(post, actor)?;
        input.validate()?;

        let author_id = actor.user_id().ok_or(AppError::Unauthorized)?;

        self.tree
            .validate_and_attach(input.content, author_id, post, input.parent_id.as_deref())
            .await
    }

    /// Edit a comment's content. Only the author or staff may do so.
    pub async fn update(
        &self,
        id: &str,
        actor: &Actor,
        input: UpdateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let comment = self.comment_repo.get_active_by_id(id).await?;
        if !actor.can_modify(&comment.author_id) {
            return Err(AppError::Forbidden("Not the comment author".to_string()));
        }

        let mut active: comment::ActiveModel = comment.into();
        active.content = Set(input.content);
        active.updated_at = Set(self.clock.now_fixed());
        active.updated_by = Set(actor.user_id().map(ToString::to_string));

        let comment = self.comment_repo.update(active).await?;

        tracing::info!(comment_id = %comment.id, "Comment updated");

        Ok(comment)
    }

    /// Get an active comment of a post `actor` may read.
    pub async fn get(&self, id: &str, actor: &Actor) -> AppResult<comment::Model> {
        let comment = self.comment_repo.get_active_by_id(id).await?;

        let post = self
            .post_repo
            .find_by_id(&comment.post_id, Scope::Active)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {id}")))?;
        VisibilityPolicy::ensure_comments_visible(&post, actor)?;

        Ok(comment)
    }

    /// One page of comment trees under `post`.
    pub async fn list_tree(
        &self,
        post: &post::Model,
        actor: &Actor,
        request: PageRequest,
    ) -> AppResult<Page<CommentNode>> {
        VisibilityPolicy::ensure_comments_visible(post, actor)?;
        self.view.list_comment_tree(post, request).await
    }
}
