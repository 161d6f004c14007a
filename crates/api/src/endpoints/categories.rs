//! Category endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use quill_common::AppResult;
use quill_core::{
    CreateCategoryInput, EntityKind, EntityRef, Page, PageRequest, UpdateCategoryInput,
};
use quill_db::entities::category;
use serde::Serialize;

use crate::{
    extractors::{AuthUser, StaffUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Category response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl From<category::Model> for CategoryResponse {
    fn from(c: category::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
        }
    }
}

/// List active categories.
async fn list(
    State(state): State<AppState>,
    Query(request): Query<PageRequest>,
) -> AppResult<ApiResponse<Page<CategoryResponse>>> {
    let page = state.category_service.list(request).await?;
    Ok(ApiResponse::ok(page.map(CategoryResponse::from)))
}

async fn create(
    staff: StaffUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let category = state.category_service.create(&staff.actor(), input).await?;
    Ok(ApiResponse::created(category.into()))
}

async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let category = state.category_service.get_by_slug(&slug).await?;
    Ok(ApiResponse::ok(category.into()))
}

async fn update(
    staff: StaffUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let category = state.category_service.update(&slug, &staff.actor(), input).await?;
    Ok(ApiResponse::ok(category.into()))
}

/// Soft delete a category. Staff only; posts keep pointing at it.
async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let category = state.category_service.get_by_slug(&slug).await?;
    state
        .admin_service
        .delete(&auth.actor(), &EntityRef::new(EntityKind::Category, category.id))
        .await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list).post(create))
        .route("/categories/{slug}", get(show).patch(update).delete(delete))
}
