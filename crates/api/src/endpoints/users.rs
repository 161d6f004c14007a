//! User endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use quill_common::AppResult;
use quill_core::{
    Actor, CreateUserInput, EntityKind, EntityRef, Page, PageRequest, UpdateUserInput,
};
use quill_db::entities::user;
use serde::Serialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// User response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    /// Only shown to the user themselves and to staff.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub is_staff: bool,
    pub created_at: String,
}

impl UserResponse {
    fn for_viewer(user: user::Model, viewer: &Actor) -> Self {
        let email = viewer.can_modify(&user.id).then_some(user.email);
        Self {
            id: user.id,
            username: user.username,
            email,
            is_staff: user.is_staff || user.is_superuser,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self::for_viewer(user, &Actor::Anonymous)
    }
}

/// Registration response, the only place the token is returned.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
}

/// Register a new account.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<ApiResponse<RegisterResponse>> {
    let user = state.user_service.register(input).await?;
    let token = user.token.clone();
    let actor = Actor::from_user(&user);

    Ok(ApiResponse::created(RegisterResponse {
        user: UserResponse::for_viewer(user, &actor),
        token,
    }))
}

/// List active users.
async fn list(
    State(state): State<AppState>,
    Query(request): Query<PageRequest>,
) -> AppResult<ApiResponse<Page<UserResponse>>> {
    let page = state.user_service.list(request).await?;
    Ok(ApiResponse::ok(page.map(UserResponse::from)))
}

/// Show one active user.
async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(&id).await?;
    Ok(ApiResponse::ok(UserResponse::for_viewer(user, &viewer.actor())))
}

/// Update a user.
async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let actor = auth.actor();
    let user = state.user_service.update(&id, &actor, input).await?;
    Ok(ApiResponse::ok(UserResponse::for_viewer(user, &actor)))
}

/// Soft delete a user. Staff only.
async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state
        .admin_service
        .delete(&auth.actor(), &EntityRef::new(EntityKind::User, id))
        .await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list).post(register))
        .route("/users/{id}", get(show).patch(update).delete(delete))
}
