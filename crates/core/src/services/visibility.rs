//! Who may see or comment on a post.
//!
//! Published posts and their comments are public. Drafts are visible to their
//! author and to staff, while a draft's comment list is open to any signed-in
//! user. That second rule is deliberately looser than the first and must not
//! be unified with it. Nobody may comment on a draft.

use quill_common::{AppError, AppResult};
use quill_db::entities::{post, user};

/// The identity a request acts as.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Actor {
    #[default]
    Anonymous,
    Authenticated {
        user_id: String,
        /// Staff or superuser.
        is_staff: bool,
    },
}

impl Actor {
    /// Actor for a signed-in user.
    #[must_use]
    pub fn from_user(user: &user::Model) -> Self {
        Self::Authenticated {
            user_id: user.id.clone(),
            is_staff: user.is_privileged(),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { user_id, .. } => Some(user_id),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Authenticated { is_staff: true, .. })
    }

    /// Author of the resource or staff.
    #[must_use]
    pub fn can_modify(&self, author_id: &str) -> bool {
        self.is_staff() || self.user_id() == Some(author_id)
    }
}

/// Read and write gates for posts and their comments.
pub struct VisibilityPolicy;

impl VisibilityPolicy {
    /// Whether `actor` may read `post`.
    #[must_use]
    pub fn can_view_post(post: &post::Model, actor: &Actor) -> bool {
        !post.is_draft() || actor.can_modify(&post.author_id)
    }

    /// Whether `actor` may list the comments of `post`.
    #[must_use]
    pub fn can_view_draft_comments(post: &post::Model, actor: &Actor) -> bool {
        !post.is_draft() || actor.is_authenticated()
    }

    /// Whether `actor` may add a comment to `post`.
    #[must_use]
    pub fn can_comment(post: &post::Model, actor: &Actor) -> bool {
        !post.is_draft() && actor.is_authenticated()
    }

    /// [`Self::can_view_post`] as a result; denial looks like a missing post.
    pub fn ensure_post_visible(post: &post::Model, actor: &Actor) -> AppResult<()> {
        if Self::can_view_post(post, actor) {
            Ok(())
        } else {
            tracing::debug!(post_id = %post.id, "Draft post hidden from actor");
            Err(AppError::NotVisible)
        }
    }

    /// [`Self::can_view_draft_comments`] as a result.
    pub fn ensure_comments_visible(post: &post::Model, actor: &Actor) -> AppResult<()> {
        if Self::can_view_draft_comments(post, actor) {
            Ok(())
        } else {
            tracing::debug!(post_id = %post.id, "Draft comments hidden from actor");
            Err(AppError::NotVisible)
        }
    }

    /// [`Self::can_comment`] as a result.
    pub fn ensure_can_comment(post: &post::Model, actor: &Actor) -> AppResult<()> {
        if post.is_draft() {
            return Err(AppError::CommentsClosed);
        }
        if !actor.is_authenticated() {
            return Err(AppError::Unauthorized);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quill_db::entities::post::PostStatus;

    fn create_test_post(status: PostStatus) -> post::Model {
        let now = Utc::now().into();
        post::Model {
            id: "post1".to_string(),
            title: "Draft".to_string(),
            slug: "draft".to_string(),
            content: String::new(),
            author_id: "author".to_string(),
            status,
            category_id: None,
            created_at: now,
            updated_at: now,
            created_by: Some("author".to_string()),
            updated_by: None,
            is_deleted: false,
            deleted_at: None,
        }
    }

    fn member(id: &str) -> Actor {
        Actor::Authenticated {
            user_id: id.to_string(),
            is_staff: false,
        }
    }

    fn staff() -> Actor {
        Actor::Authenticated {
            user_id: "admin".to_string(),
            is_staff: true,
        }
    }

    #[test]
    fn test_draft_post_hidden_from_anonymous_visible_to_author() {
        let draft = create_test_post(PostStatus::Draft);

        assert!(!VisibilityPolicy::can_view_post(&draft, &Actor::Anonymous));
        assert!(VisibilityPolicy::can_view_post(&draft, &member("author")));
    }

    #[test]
    fn test_draft_post_rules_for_others() {
        let draft = create_test_post(PostStatus::Draft);

        assert!(!VisibilityPolicy::can_view_post(&draft, &member("stranger")));
        assert!(VisibilityPolicy::can_view_post(&draft, &staff()));
    }

    #[test]
    fn test_draft_comments_open_to_any_member() {
        let draft = create_test_post(PostStatus::Draft);

        assert!(!VisibilityPolicy::can_view_draft_comments(&draft, &Actor::Anonymous));
        assert!(VisibilityPolicy::can_view_draft_comments(&draft, &member("stranger")));
        // stricter rule for the post itself still holds
        assert!(!VisibilityPolicy::can_view_post(&draft, &member("stranger")));
    }

    #[test]
    fn test_published_is_public() {
        let published = create_test_post(PostStatus::Published);

        assert!(VisibilityPolicy::can_view_post(&published, &Actor::Anonymous));
        assert!(VisibilityPolicy::can_view_draft_comments(&published, &Actor::Anonymous));
        assert!(VisibilityPolicy::can_comment(&published, &member("reader")));
        assert!(!VisibilityPolicy::can_comment(&published, &Actor::Anonymous));
    }

    #[test]
    fn test_nobody_comments_on_drafts() {
        let draft = create_test_post(PostStatus::Draft);

        for actor in [member("author"), staff()] {
            assert!(!VisibilityPolicy::can_comment(&draft, &actor));
            assert!(matches!(
                VisibilityPolicy::ensure_can_comment(&draft, &actor),
                Err(AppError::CommentsClosed)
            ));
        }
    }

    #[test]
    fn test_denial_is_not_visible() {
        let draft = create_test_post(PostStatus::Draft);

        assert!(matches!(
            VisibilityPolicy::ensure_post_visible(&draft, &Actor::Anonymous),
            Err(AppError::NotVisible)
        ));
        assert!(matches!(
            VisibilityPolicy::ensure_comments_visible(&draft, &Actor::Anonymous),
            Err(AppError::NotVisible)
        ));
    }
}
