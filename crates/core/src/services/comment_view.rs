//! Read-side assembly of comment trees.
//!
//! A page costs three queries whatever the size of the reply trees: the root
//! count, the page of roots, and the active replies under those roots. The
//! nesting is then built in memory one depth level at a time, deepest first.

use std::collections::HashMap;

use quill_common::{AppResult, BlogConfig};
use quill_db::entities::{comment, post};
use quill_db::repositories::{CommentRepository, Scope};
use serde::Serialize;

use super::pagination::{Page, PageRequest};

/// A comment with its active replies nested below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub comment: comment::Model,
    /// Active direct replies.
    pub reply_count: u64,
    /// Oldest first.
    pub replies: Vec<CommentNode>,
}

/// Nest `replies` under `roots`.
///
/// Replies whose parent is not among the roots or the other replies (for
/// example because it was deleted) are unreachable and dropped together with
/// their own subtrees. Sibling order follows the input order.
#[must_use]
pub fn assemble(roots: Vec<comment::Model>, replies: Vec<comment::Model>) -> Vec<CommentNode> {
    let mut levels: Vec<Vec<comment::Model>> = Vec::new();
    for reply in replies {
        let level = usize::try_from(reply.depth).unwrap_or(0);
        if levels.len() <= level {
            levels.resize_with(level + 1, Vec::new);
        }
        levels[level].push(reply);
    }

    let mut children: HashMap<String, Vec<CommentNode>> = HashMap::new();
    for level in levels.into_iter().rev() {
        for reply in level {
            let node = into_node(reply, &mut children);
            if let Some(parent_id) = node.comment.parent_id.clone() {
                children.entry(parent_id).or_default().push(node);
            }
        }
    }

    roots
        .into_iter()
        .map(|root| into_node(root, &mut children))
        .collect()
}

fn into_node(comment: comment::Model, children: &mut HashMap<String, Vec<CommentNode>>) -> CommentNode {
    let replies = children.remove(&comment.id).unwrap_or_default();
    CommentNode {
        reply_count: replies.len() as u64,
        comment,
        replies,
    }
}

/// Paginated comment trees for a post.
#[derive(Clone)]
pub struct CommentView {
    comment_repo: CommentRepository,
    default_page_size: u64,
    max_page_size: u64,
}

impl CommentView {
    #[must_use]
    pub fn new(comment_repo: CommentRepository, blog: &BlogConfig) -> Self {
        Self {
            comment_repo,
            default_page_size: blog.comment_page_size,
            max_page_size: blog.max_comment_page_size,
        }
    }

    /// One page of root comments of `post`, each with its full reply tree.
    ///
    /// Only active roots count toward the page size.
    pub async fn list_comment_tree(
        &self,
        post: &post::Model,
        request: PageRequest,
    ) -> AppResult<Page<CommentNode>> {
        let (page, limit, offset) = request.resolve(self.default_page_size, self.max_page_size);

        let total = self.comment_repo.count_roots(&post.id, Scope::Active).await?;
        let roots = self
            .comment_repo
            .find_roots(&post.id, Scope::Active, limit, offset)
            .await?;

        let root_ids: Vec<String> = roots.iter().map(|root| root.id.clone()).collect();
        let replies = self.comment_repo.find_descendants(&root_ids).await?;

        tracing::debug!(
            post_id = %post.id,
            page,
            roots = roots.len(),
            replies = replies.len(),
            "Assembling comment tree"
        );

        Ok(Page::new(assemble(roots, replies), total, page, limit))
    }
}
