//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use quill_common::{BlogConfig, ClockService};
use quill_core::{
    AdminService, CategoryService, CommentService, PostService, TagService, UserService,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub category_service: CategoryService,
    pub tag_service: TagService,
    pub admin_service: AdminService,
}

impl AppState {
    /// Build every service over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, clock: ClockService, blog: &BlogConfig) -> Self {
        Self {
            user_service: UserService::new(Arc::clone(&db), Arc::clone(&clock)),
            post_service: PostService::new(Arc::clone(&db), Arc::clone(&clock), blog),
            comment_service: CommentService::new(Arc::clone(&db), Arc::clone(&clock), blog),
            category_service: CategoryService::new(Arc::clone(&db), Arc::clone(&clock)),
            tag_service: TagService::new(Arc::clone(&db), Arc::clone(&clock)),
            admin_service: AdminService::new(db, clock),
        }
    }
}

/// Authentication middleware.
///
/// A valid `Authorization: Bearer <token>` puts the user into the request
/// extensions. Anything else leaves the request anonymous; the extractors
/// decide whether that is acceptable.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&req) {
        match state.user_service.authenticate_by_token(token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!(error = %e, "Bearer token rejected"),
        }
    }

    next.run(req).await
}

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
