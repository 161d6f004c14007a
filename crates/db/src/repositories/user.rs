//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use crate::repositories::scope::{self, Scope};
use quill_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID within a scope.
    pub async fn find_by_id(&self, id: &str, scope: Scope) -> AppResult<Option<user::Model>> {
        scope::find_by_id::<User, _>(self.db.as_ref(), id, scope).await
    }

    /// Find an active user by ID, returning an error if not found.
    pub async fn get_active_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id, Scope::Active)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {id}")))
    }

    /// Find the user owning a bearer token.
    ///
    /// Deleted users and users with login disabled never match.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        Scope::Active
            .apply(User::find())
            .filter(user::Column::Token.eq(token))
            .filter(user::Column::IsActive.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by username in the all-inclusive view.
    ///
    /// Usernames stay reserved while the account is soft-deleted.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by email in the all-inclusive view.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List users ordered by ID.
    pub async fn list(&self, scope: Scope, limit: u64, offset: u64) -> AppResult<Vec<user::Model>> {
        scope::list::<User, _>(self.db.as_ref(), scope, limit, offset).await
    }

    /// Count users within a scope.
    pub async fn count(&self, scope: Scope) -> AppResult<u64> {
        scope::count::<User, _>(self.db.as_ref(), scope).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_user(id: &str, username: &str) -> user::Model {
        let now = Utc::now().into();
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
            token: format!("token-{id}"),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
            is_deleted: false,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_active_by_id_found() {
        let user = create_test_user("user1", "alice");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let found = repo.get_active_by_id("user1").await.unwrap();

        assert_eq!(found.username, "alice");
    }

    #[tokio::test]
    async fn test_get_active_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_active_by_id("missing").await;

        match result {
            Err(AppError::NotFound(msg)) => assert!(msg.contains("missing")),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_by_token_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_token("stale").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_all_includes_deleted() {
        let active = create_test_user("user1", "alice");
        let mut deleted = create_test_user("user2", "bob");
        deleted.is_deleted = true;
        deleted.is_active = false;
        deleted.deleted_at = Some(Utc::now().into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[active, deleted]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let users = repo.list(Scope::All, 10, 0).await.unwrap();

        assert_eq!(users.len(), 2);
        assert!(users[1].is_deleted);
    }
}
