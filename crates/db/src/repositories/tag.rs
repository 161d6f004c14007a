//! Tag repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{PostTag, Tag, post_tag, tag};
use crate::repositories::scope::{self, Scope};
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, sea_query::JoinType,
};

/// Tag repository for database operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a tag by ID within a scope.
    pub async fn find_by_id(&self, id: &str, scope: Scope) -> AppResult<Option<tag::Model>> {
        scope::find_by_id::<Tag, _>(self.db.as_ref(), id, scope).await
    }

    /// Find a tag by slug within a scope.
    pub async fn find_by_slug(&self, slug: &str, scope: Scope) -> AppResult<Option<tag::Model>> {
        scope
            .apply(Tag::find())
            .filter(tag::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an active tag by slug, returning an error if not found.
    pub async fn get_active_by_slug(&self, slug: &str) -> AppResult<tag::Model> {
        self.find_by_slug(slug, Scope::Active)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {slug}")))
    }

    /// Find active tags by slug.
    ///
    /// Unknown or deleted slugs are simply absent from the result.
    pub async fn find_active_by_slugs<C: ConnectionTrait>(
        conn: &C,
        slugs: &[String],
    ) -> AppResult<Vec<tag::Model>> {
        if slugs.is_empty() {
            return Ok(vec![]);
        }

        Scope::Active
            .apply(Tag::find())
            .filter(tag::Column::Slug.is_in(slugs.to_vec()))
            .order_by_asc(tag::Column::Id)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active tags attached to a post, ordered by ID.
    pub async fn find_for_post(&self, post_id: &str) -> AppResult<Vec<tag::Model>> {
        Scope::Active
            .apply(Tag::find())
            .join(JoinType::InnerJoin, tag::Relation::PostTags.def())
            .filter(post_tag::Column::PostId.eq(post_id))
            .order_by_asc(tag::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replace the tag set of a post.
    pub async fn replace_for_post<C: ConnectionTrait>(
        conn: &C,
        post_id: &str,
        tag_ids: &[String],
    ) -> AppResult<()> {
        PostTag::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if tag_ids.is_empty() {
            return Ok(());
        }

        let links = tag_ids.iter().map(|tag_id| post_tag::ActiveModel {
            post_id: sea_orm::Set(post_id.to_string()),
            tag_id: sea_orm::Set(tag_id.clone()),
        });

        PostTag::insert_many(links)
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Find a tag by name, deleted rows included.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<tag::Model>> {
        Tag::find()
            .filter(tag::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The candidate slugs already taken, deleted rows included.
    pub async fn taken_slugs(&self, candidates: Vec<String>) -> AppResult<HashSet<String>> {
        super::taken_slugs::<Tag, _>(self.db.as_ref(), tag::Column::Slug, candidates).await
    }

    /// Create a new tag.
    pub async fn create(&self, model: tag::ActiveModel) -> AppResult<tag::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a tag.
    pub async fn update(&self, model: tag::ActiveModel) -> AppResult<tag::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List tags ordered by ID.
    pub async fn list(&self, scope: Scope, limit: u64, offset: u64) -> AppResult<Vec<tag::Model>> {
        scope::list::<Tag, _>(self.db.as_ref(), scope, limit, offset).await
    }

    /// Count tags within a scope.
    pub async fn count(&self, scope: Scope) -> AppResult<u64> {
        scope::count::<Tag, _>(self.db.as_ref(), scope).await
    }
}
