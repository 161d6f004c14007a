//! Request extractors.
//!
//! The auth middleware leaves the signed-in user, if any, in the request
//! extensions. These extractors read it back and reject requests that do not
//! meet the handler's requirement.

use axum::{extract::FromRequestParts, http::request::Parts};
use quill_common::AppError;
use quill_core::Actor;
use quill_db::entities::user;

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl AuthUser {
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::from_user(&self.0)
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl MaybeAuthUser {
    #[must_use]
    pub fn actor(&self) -> Actor {
        self.0.as_ref().map(Actor::from_user).unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

/// Staff or superuser extractor.
#[derive(Debug, Clone)]
pub struct StaffUser(pub user::Model);

impl StaffUser {
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::from_user(&self.0)
    }
}

impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_privileged() {
            return Err(AppError::Forbidden("Staff only".to_string()));
        }
        Ok(Self(user))
    }
}
