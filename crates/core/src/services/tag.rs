//! Tag service.

use std::sync::Arc;

use quill_common::{AppError, AppResult, ClockService, IdGenerator};
use quill_db::entities::tag;
use quill_db::repositories::{Scope, TagRepository};
use sea_orm::{DatabaseConnection, Set};
use serde::Deserialize;
use validator::Validate;

use super::category::require_staff;
use super::pagination::{Page, PageRequest};
use super::slug::{allocate_slug, slugify};
use super::visibility::Actor;

const SLUG_MAX_LEN: usize = 60;
const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 100;

/// Input for creating a tag.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,

    #[validate(length(min = 1, max = 60))]
    pub slug: Option<String>,
}

/// Input for renaming a tag.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTagInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

/// Tag service for business logic.
#[derive(Clone)]
pub struct TagService {
    tag_repo: TagRepository,
    clock: ClockService,
    id_gen: IdGenerator,
}

impl TagService {
    /// Create a new tag service.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>, clock: ClockService) -> Self {
        Self {
            tag_repo: TagRepository::new(db),
            clock,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a tag. Staff only.
    pub async fn create(&self, actor: &Actor, input: CreateTagInput) -> AppResult<tag::Model> {
        let actor_id = require_staff(actor)?;
        input.validate()?;

        if self.tag_repo.find_by_name(&input.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Tag name already taken: {}",
                input.name
            )));
        }

        let base = slugify(input.slug.as_deref().unwrap_or(&input.name), SLUG_MAX_LEN);
        if base.is_empty() && input.slug.is_some() {
            return Err(AppError::Validation("Invalid slug".to_string()));
        }
        let base = if base.is_empty() { "tag".to_string() } else { base };

        let slug = if input.slug.is_some() {
            if !self.tag_repo.taken_slugs(vec![base.clone()]).await?.is_empty() {
                return Err(AppError::Conflict(format!("Slug already taken: {base}")));
            }
            base
        } else {
            let repo = &self.tag_repo;
            allocate_slug(&base, SLUG_MAX_LEN, move |candidates| {
                repo.taken_slugs(candidates)
            })
            .await?
        };

        let now = self.clock.now_fixed();
        let model = tag::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            slug: Set(slug),
            created_at: Set(now),
            updated_at: Set(now),
            created_by: Set(Some(actor_id.to_string())),
            updated_by: Set(Some(actor_id.to_string())),
            is_deleted: Set(false),
            deleted_at: Set(None),
        };

        let tag = self.tag_repo.create(model).await?;

        tracing::info!(tag_id = %tag.id, slug = %tag.slug, "Tag created");

        Ok(tag)
    }

    /// Rename a tag. Staff only.
    pub async fn update(
        &self,
        slug: &str,
        actor: &Actor,
        input: UpdateTagInput,
    ) -> AppResult<tag::Model> {
        let actor_id = require_staff(actor)?;
        input.validate()?;

        let tag = self.tag_repo.get_active_by_slug(slug).await?;

        if let Some(existing) = self.tag_repo.find_by_name(&input.name).await? {
            if existing.id != tag.id {
                return Err(AppError::Conflict(format!(
                    "Tag name already taken: {}",
                    input.name
                )));
            }
        }

        let mut active: tag::ActiveModel = tag.into();
        active.name = Set(input.name);
        active.updated_at = Set(self.clock.now_fixed());
        active.updated_by = Set(Some(actor_id.to_string()));

        self.tag_repo.update(active).await
    }

    /// Get an active tag by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<tag::Model> {
        self.tag_repo.get_active_by_slug(slug).await
    }

    /// Active tags ordered by ID.
    pub async fn list(&self, request: PageRequest) -> AppResult<Page<tag::Model>> {
        let (page, limit, offset) = request.resolve(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
        let total = self.tag_repo.count(Scope::Active).await?;
        let items = self.tag_repo.list(Scope::Active, limit, offset).await?;
        Ok(Page::new(items, total, page, limit))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quill_common::SystemClock;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_tag(id: &str, name: &str, slug: &str) -> tag::Model {
        let now = Utc::now().into();
        tag::Model {
            id: id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
            is_deleted: false,
            deleted_at: None,
        }
    }

    fn staff() -> Actor {
        Actor::Authenticated {
            user_id: "admin".to_string(),
            is_staff: true,
        }
    }

    fn service(db: MockDatabase) -> TagService {
        TagService::new(Arc::new(db.into_connection()), Arc::new(SystemClock))
    }

    #[tokio::test]
    async fn test_anonymous_cannot_create() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .create(
                &Actor::Anonymous,
                CreateTagInput {
                    name: "rust".to_string(),
                    slug: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_create_tag() {
        let created = create_test_tag("tag1", "Async Rust", "async-rust");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<tag::Model>::new()])
                .append_query_results([Vec::<std::collections::BTreeMap<&str, sea_orm::Value>>::new()])
                .append_query_results([[created.clone()]]),
        );

        let tag = service
            .create(
                &staff(),
                CreateTagInput {
                    name: "Async Rust".to_string(),
                    slug: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(tag.slug, "async-rust");
    }

    #[tokio::test]
    async fn test_rename_to_taken_name_is_conflict() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_tag("tag1", "rust", "rust")]])
                .append_query_results([[create_test_tag("tag2", "go", "go")]]),
        );

        let result = service
            .update(
                "rust",
                &staff(),
                UpdateTagInput {
                    name: "go".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
