//! Post endpoints, including a post's comment tree.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use quill_common::AppResult;
use quill_core::{
    CreateCommentInput, CreatePostInput, EntityKind, EntityRef, Page, PageRequest, PostDetail,
    UpdatePostInput,
};
use quill_db::entities::post::{self, PostStatus};
use quill_db::repositories::{PostFilter, PostOrdering};
use serde::{Deserialize, Serialize};

use super::comments::{CommentNodeResponse, CommentResponse};
use super::tags::TagResponse;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

// ==================== Request/Response Types ====================

/// Post response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub author_id: String,
    pub status: PostStatus,
    pub category_id: Option<String>,
    /// Present on single-post responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TagResponse>>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<post::Model> for PostResponse {
    fn from(p: post::Model) -> Self {
        Self {
            id: p.id,
            title: p.title,
            slug: p.slug,
            content: p.content,
            author_id: p.author_id,
            status: p.status,
            category_id: p.category_id,
            tags: None,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

impl From<PostDetail> for PostResponse {
    fn from(detail: PostDetail) -> Self {
        let mut response = Self::from(detail.post);
        response.tags = Some(detail.tags.into_iter().map(Into::into).collect());
        response
    }
}

/// Post listing query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    pub page_size: Option<u64>,
    pub status: Option<PostStatus>,
    /// Category slug.
    pub category: Option<String>,
    /// Tag slug.
    pub tag: Option<String>,
    /// Author username.
    pub author: Option<String>,
    pub search: Option<String>,
    /// `id`, `title` or `created_at`, `-` prefixed for descending. Other
    /// values keep the default order.
    pub ordering: Option<String>,
}

const fn default_page() -> u64 {
    1
}

impl ListPostsQuery {
    fn into_parts(self) -> (PostFilter, PageRequest) {
        let request = PageRequest {
            page: self.page,
            page_size: self.page_size,
        };
        let filter = PostFilter {
            status: self.status,
            category: self.category,
            tag: self.tag,
            author: self.author,
            author_id: None,
            search: self.search,
            ordering: self
                .ordering
                .as_deref()
                .and_then(PostOrdering::parse)
                .unwrap_or_default(),
        };
        (filter, request)
    }
}

// ==================== Handlers ====================

/// List posts. Published only unless `status=draft` is asked for.
async fn list(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> AppResult<ApiResponse<Page<PostResponse>>> {
    let (filter, request) = query.into_parts();
    let page = state
        .post_service
        .list(&viewer.actor(), filter, request)
        .await?;
    Ok(ApiResponse::ok(page.map(PostResponse::from)))
}

async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let detail = state.post_service.create(&auth.0.id, input).await?;
    Ok(ApiResponse::created(detail.into()))
}

async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<PostResponse>> {
    let detail = state
        .post_service
        .get_by_slug(&slug, &viewer.actor())
        .await?;
    Ok(ApiResponse::ok(detail.into()))
}

async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<UpdatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let detail = state
        .post_service
        .update(&slug, &auth.actor(), input)
        .await?;
    Ok(ApiResponse::ok(detail.into()))
}

/// Soft delete a post. Its comments stay but cannot be restored until the
/// post is.
async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let actor = auth.actor();
    let post = state.post_service.get_visible(&slug, &actor).await?;
    state
        .admin_service
        .delete(&actor, &EntityRef::new(EntityKind::Post, post.id))
        .await?;
    Ok(no_content())
}

/// One page of root comments with their reply trees.
async fn list_comments(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(request): Query<PageRequest>,
) -> AppResult<ApiResponse<Page<CommentNodeResponse>>> {
    // Draft comments follow their own rule, not the post's.
    let post = state.post_service.get_active(&slug).await?;
    let page = state
        .comment_service
        .list_tree(&post, &viewer.actor(), request)
        .await?;
    Ok(ApiResponse::ok(page.map(CommentNodeResponse::from)))
}

async fn create_comment(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<CreateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let actor = viewer.actor();
    let post = state.post_service.get_visible(&slug, &actor).await?;
    let comment = state.comment_service.create(&post, &actor, input).await?;
    Ok(ApiResponse::created(comment.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list).post(create))
        .route("/posts/{slug}", get(show).patch(update).delete(delete))
        .route(
            "/posts/{slug}/comments",
            get(list_comments).post(create_comment),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use quill_db::repositories::PostOrderField;

    #[test]
    fn test_list_query_defaults() {
        let query: ListPostsQuery = serde_json::from_str("{}").unwrap();
        let (filter, request) = query.into_parts();

        assert_eq!(filter, PostFilter::default());
        assert_eq!(request, PageRequest::default());
    }

    #[test]
    fn test_list_query_carries_filters() {
        let query: ListPostsQuery = serde_json::from_str(
            r#"{"page": 2, "pageSize": 5, "status": "draft", "tag": "rust", "search": "async"}"#,
        )
        .unwrap();
        let (filter, request) = query.into_parts();

        assert_eq!(filter.status, Some(PostStatus::Draft));
        assert_eq!(filter.tag.as_deref(), Some("rust"));
        assert_eq!(filter.search.as_deref(), Some("async"));
        assert_eq!(request, PageRequest::new(2, 5));
    }

    #[test]
    fn test_list_query_ordering() {
        let query: ListPostsQuery = serde_json::from_str(r#"{"ordering": "-title"}"#).unwrap();
        let (filter, _) = query.into_parts();

        assert_eq!(filter.ordering.field, PostOrderField::Title);
        assert!(filter.ordering.descending);

        let query: ListPostsQuery = serde_json::from_str(r#"{"ordering": "password"}"#).unwrap();
        let (filter, _) = query.into_parts();

        assert_eq!(filter.ordering, PostOrdering::default());
    }
}
