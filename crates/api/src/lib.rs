//! HTTP API layer for quill.
//!
//! JSON over Axum 0.8:
//!
//! - **Endpoints**: users, posts with their comment trees, categories, tags,
//!   and the staff-only audit and restore routes
//! - **Extractors**: bearer-token identity resolved into an [`Actor`]
//! - **Middleware**: token authentication and the shared [`AppState`]
//!
//! [`Actor`]: quill_core::Actor
//! [`AppState`]: middleware::AppState

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
