//! API endpoints.

mod admin;
mod auth;
mod categories;
mod comments;
mod posts;
mod tags;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(posts::router())
        .merge(comments::router())
        .merge(categories::router())
        .merge(tags::router())
        .merge(admin::router())
}
