//! Category repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{Category, category};
use crate::repositories::scope::{self, Scope};
use quill_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Category repository for database operations.
#[derive(Clone)]
pub struct CategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl CategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a category by ID within a scope.
    pub async fn find_by_id(&self, id: &str, scope: Scope) -> AppResult<Option<category::Model>> {
        scope::find_by_id::<Category, _>(self.db.as_ref(), id, scope).await
    }

    /// Find a category by slug within a scope.
    pub async fn find_by_slug(
        &self,
        slug: &str,
        scope: Scope,
    ) -> AppResult<Option<category::Model>> {
        scope
            .apply(Category::find())
            .filter(category::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an active category by slug, returning an error if not found.
    pub async fn get_active_by_slug(&self, slug: &str) -> AppResult<category::Model> {
        self.find_by_slug(slug, Scope::Active)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {slug}")))
    }

    /// Find a category by name, deleted rows included.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<category::Model>> {
        Category::find()
            .filter(category::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The candidate slugs already taken, deleted rows included.
    pub async fn taken_slugs(&self, candidates: Vec<String>) -> AppResult<HashSet<String>> {
        super::taken_slugs::<Category, _>(self.db.as_ref(), category::Column::Slug, candidates).await
    }

    /// Create a new category.
    pub async fn create(&self, model: category::ActiveModel) -> AppResult<category::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a category.
    pub async fn update(&self, model: category::ActiveModel) -> AppResult<category::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List categories ordered by ID.
    pub async fn list(
        &self,
        scope: Scope,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<category::Model>> {
        scope::list::<Category, _>(self.db.as_ref(), scope, limit, offset).await
    }

    /// Count categories within a scope.
    pub async fn count(&self, scope: Scope) -> AppResult<u64> {
        scope::count::<Category, _>(self.db.as_ref(), scope).await
    }
}
