//! Tag endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use quill_common::AppResult;
use quill_core::{CreateTagInput, EntityKind, EntityRef, Page, PageRequest, UpdateTagInput};
use quill_db::entities::tag;
use serde::Serialize;

use crate::{
    extractors::{AuthUser, StaffUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Tag response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl From<tag::Model> for TagResponse {
    fn from(t: tag::Model) -> Self {
        Self {
            id: t.id,
            name: t.name,
            slug: t.slug,
        }
    }
}

async fn list(
    State(state): State<AppState>,
    Query(request): Query<PageRequest>,
) -> AppResult<ApiResponse<Page<TagResponse>>> {
    let page = state.tag_service.list(request).await?;
    Ok(ApiResponse::ok(page.map(TagResponse::from)))
}

async fn create(
    staff: StaffUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTagInput>,
) -> AppResult<ApiResponse<TagResponse>> {
    let tag = state.tag_service.create(&staff.actor(), input).await?;
    Ok(ApiResponse::created(tag.into()))
}

async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<TagResponse>> {
    let tag = state.tag_service.get_by_slug(&slug).await?;
    Ok(ApiResponse::ok(tag.into()))
}

async fn update(
    staff: StaffUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<UpdateTagInput>,
) -> AppResult<ApiResponse<TagResponse>> {
    let tag = state.tag_service.update(&slug, &staff.actor(), input).await?;
    Ok(ApiResponse::ok(tag.into()))
}

async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let tag = state.tag_service.get_by_slug(&slug).await?;
    state
        .admin_service
        .delete(&auth.actor(), &EntityRef::new(EntityKind::Tag, tag.id))
        .await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list).post(create))
        .route("/tags/{slug}", get(show).patch(update).delete(delete))
}
