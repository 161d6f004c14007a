//! Comment endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use quill_common::AppResult;
use quill_core::{CommentNode, EntityKind, EntityRef, UpdateCommentInput};
use quill_db::entities::comment;
use serde::Serialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Comment response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub content: String,
    pub parent_id: Option<String>,
    pub depth: i16,
    pub created_at: String,
    pub updated_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            author_id: c.author_id,
            content: c.content,
            parent_id: c.parent_id,
            depth: c.depth,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

/// A comment with its nested replies.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNodeResponse {
    #[serde(flatten)]
    pub comment: CommentResponse,
    pub reply_count: u64,
    pub replies: Vec<CommentNodeResponse>,
}

impl From<CommentNode> for CommentNodeResponse {
    fn from(node: CommentNode) -> Self {
        Self {
            comment: node.comment.into(),
            reply_count: node.reply_count,
            replies: node.replies.into_iter().map(Into::into).collect(),
        }
    }
}

async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.get(&id, &viewer.actor()).await?;
    Ok(ApiResponse::ok(comment.into()))
}

/// Edit a comment's content.
async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .update(&id, &auth.actor(), input)
        .await?;
    Ok(ApiResponse::ok(comment.into()))
}

/// Soft delete a comment. Its replies disappear from the tree with it.
async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state
        .admin_service
        .delete(&auth.actor(), &EntityRef::new(EntityKind::Comment, id))
        .await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/comments/{id}", get(show).patch(update).delete(delete))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_comment(id: &str, parent_id: Option<&str>, depth: i16) -> comment::Model {
        let now = Utc::now().into();
        comment::Model {
            id: id.to_string(),
            post_id: "post1".to_string(),
            author_id: "reader".to_string(),
            content: format!("comment {id}"),
            parent_id: parent_id.map(ToString::to_string),
            depth,
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
            is_deleted: false,
            deleted_at: None,
        }
    }

    #[test]
    fn test_node_serializes_flat_with_nested_replies() {
        let tree = quill_core::assemble(
            vec![create_test_comment("a", None, 0)],
            vec![create_test_comment("b", Some("a"), 1)],
        );
        let response = CommentNodeResponse::from(tree.into_iter().next().unwrap());

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["id"], "a");
        assert_eq!(json["replyCount"], 1);
        assert_eq!(json["replies"][0]["parentId"], "a");
        assert_eq!(json["replies"][0]["depth"], 1);
        assert_eq!(json["replies"][0]["replyCount"], 0);
    }
}
