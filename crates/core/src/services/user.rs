//! User service.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use quill_common::{AppError, AppResult, ClockService, IdGenerator};
use quill_db::{entities::user, repositories::UserRepository, repositories::Scope};
use sea_orm::{DatabaseConnection, Set};
use serde::Deserialize;
use validator::Validate;

use super::pagination::{Page, PageRequest};
use super::visibility::Actor;

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

/// Input for registering a user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(email, length(max = 254))]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Input for updating a user.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    clock: ClockService,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>, clock: ClockService) -> Self {
        Self {
            user_repo: UserRepository::new(db),
            clock,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user.
    ///
    /// Usernames and emails of soft-deleted accounts stay reserved.
    pub async fn register(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if self.user_repo.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }
        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let user_id = self.id_gen.generate();
        let now = self.clock.now_fixed();
        let model = user::ActiveModel {
            id: Set(user_id.clone()),
            username: Set(input.username),
            email: Set(input.email),
            password_hash: Set(password_hash),
            token: Set(self.id_gen.generate_token()),
            is_active: Set(true),
            is_staff: Set(false),
            is_superuser: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            created_by: Set(Some(user_id.clone())),
            updated_by: Set(Some(user_id)),
            is_deleted: Set(false),
            deleted_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    /// Get an active user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_active_by_id(id).await
    }

    /// Active users ordered by ID.
    pub async fn list(&self, request: PageRequest) -> AppResult<Page<user::Model>> {
        let (page, limit, offset) = request.resolve(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
        let total = self.user_repo.count(Scope::Active).await?;
        let items = self.user_repo.list(Scope::Active, limit, offset).await?;
        Ok(Page::new(items, total, page, limit))
    }

    /// Update a user. Only the user themselves or staff may do so.
    pub async fn update(
        &self,
        id: &str,
        actor: &Actor,
        input: UpdateUserInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_active_by_id(id).await?;
        if !actor.can_modify(&user.id) {
            return Err(AppError::Forbidden("Cannot modify another user".to_string()));
        }

        let mut active: user::ActiveModel = user.clone().into();
        if let Some(email) = input.email {
            if email != user.email {
                if let Some(existing) = self.user_repo.find_by_email(&email).await? {
                    if existing.id != user.id {
                        return Err(AppError::Conflict("Email already registered".to_string()));
                    }
                }
            }
            active.email = Set(email);
        }
        active.updated_at = Set(self.clock.now_fixed());
        active.updated_by = Set(actor.user_id().map(ToString::to_string));

        self.user_repo.update(active).await
    }

    /// Authenticate a user by bearer token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Authenticate a user by username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .filter(|u| !u.is_deleted && u.is_active)
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(username = %username, "Password mismatch");
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against an Argon2 hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
