//! Category service.

use std::sync::Arc;

use quill_common::{AppError, AppResult, ClockService, IdGenerator};
use quill_db::entities::category;
use quill_db::repositories::{CategoryRepository, Scope};
use sea_orm::{DatabaseConnection, Set};
use serde::Deserialize;
use validator::Validate;

use super::pagination::{Page, PageRequest};
use super::slug::{allocate_slug, slugify};
use super::visibility::Actor;

const SLUG_MAX_LEN: usize = 120;
const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

/// Input for creating a category.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    /// Derived from the name when absent.
    #[validate(length(min = 1, max = 120))]
    pub slug: Option<String>,
}

/// Input for renaming a category.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Category service for business logic.
#[derive(Clone)]
pub struct CategoryService {
    category_repo: CategoryRepository,
    clock: ClockService,
    id_gen: IdGenerator,
}

impl CategoryService {
    /// Create a new category service.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>, clock: ClockService) -> Self {
        Self {
            category_repo: CategoryRepository::new(db),
            clock,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a category. Staff only.
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateCategoryInput,
    ) -> AppResult<category::Model> {
        let actor_id = require_staff(actor)?;
        input.validate()?;

        if self.category_repo.find_by_name(&input.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Category name already taken: {}",
                input.name
            )));
        }

        let slug = match input.slug.as_deref() {
            Some(requested) => {
                let slug = slugify(requested, SLUG_MAX_LEN);
                if slug.is_empty() {
                    return Err(AppError::Validation(format!("Invalid slug: {requested}")));
                }
                if !self
                    .category_repo
                    .taken_slugs(vec![slug.clone()])
                    .await?
                    .is_empty()
                {
                    return Err(AppError::Conflict(format!("Slug already taken: {slug}")));
                }
                slug
            }
            None => {
                let base = slugify(&input.name, SLUG_MAX_LEN);
                let base = if base.is_empty() { "category".to_string() } else { base };
                let repo = &self.category_repo;
                allocate_slug(&base, SLUG_MAX_LEN, move |candidates| {
                    repo.taken_slugs(candidates)
                })
                .await?
            }
        };

        let now = self.clock.now_fixed();
        let model = category::ActiveModel {
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

        let category = self.category_repo.create(model).await?;

        tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");

        Ok(category)
    }

    /// Rename a category. Staff only; the slug is kept.
    pub async fn update(
        &self,
        slug: &str,
        actor: &Actor,
        input: UpdateCategoryInput,
    ) -> AppResult<category::Model> {
        let actor_id = require_staff(actor)?;
        input.validate()?;

        let category = self.category_repo.get_active_by_slug(slug).await?;

        if let Some(existing) = self.category_repo.find_by_name(&input.name).await? {
            if existing.id != category.id {
                return Err(AppError::Conflict(format!(
                    "Category name already taken: {}",
                    input.name
                )));
            }
        }

        let mut active: category::ActiveModel = category.into();
        active.name = Set(input.name);
        active.updated_at = Set(self.clock.now_fixed());
        active.updated_by = Set(Some(actor_id.to_string()));

        let category = self.category_repo.update(active).await?;

        tracing::info!(category_id = %category.id, "Category updated");

        Ok(category)
    }

    /// Get an active category by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<category::Model> {
        self.category_repo.get_active_by_slug(slug).await
    }

    /// Active categories ordered by ID.
    pub async fn list(&self, request: PageRequest) -> AppResult<Page<category::Model>> {
        let (page, limit, offset) = request.resolve(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
        let total = self.category_repo.count(Scope::Active).await?;
        let items = self.category_repo.list(Scope::Active, limit, offset).await?;
        Ok(Page::new(items, total, page, limit))
    }
}

/// The actor's user ID if they are staff.
pub(crate) fn require_staff(actor: &Actor) -> AppResult<&str> {
    match actor.user_id() {
        Some(id) if actor.is_staff() => Ok(id),
        Some(_) => Err(AppError::Forbidden("Staff only".to_string())),
        None => Err(AppError::Unauthorized),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quill_common::SystemClock;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_category(id: &str, name: &str, slug: &str) -> category::Model {
        let now = Utc::now().into();
        category::Model {
            id: id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            created_at: now,
            updated_at: now,
            created_by: Some("admin".to_string()),
            updated_by: Some("admin".to_string()),
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

    fn service(db: MockDatabase) -> CategoryService {
        CategoryService::new(Arc::new(db.into_connection()), Arc::new(SystemClock))
    }

    #[test]
    fn test_require_staff() {
        let member = Actor::Authenticated {
            user_id: "u1".to_string(),
            is_staff: false,
        };

        assert_eq!(require_staff(&staff()).unwrap(), "admin");
        assert!(matches!(require_staff(&member), Err(AppError::Forbidden(_))));
        assert!(matches!(
            require_staff(&Actor::Anonymous),
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_create_by_non_staff_is_forbidden() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let member = Actor::Authenticated {
            user_id: "u1".to_string(),
            is_staff: false,
        };

        let result = service
            .create(
                &member,
                CreateCategoryInput {
                    name: "Rust".to_string(),
                    slug: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_duplicate_name_is_conflict() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_category("cat1", "Rust", "rust")]]),
        );

        let result = service
            .create(
                &staff(),
                CreateCategoryInput {
                    name: "Rust".to_string(),
                    slug: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_derives_free_slug() {
        let created = create_test_category("cat2", "Rust!", "rust-1");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<category::Model>::new()])
                .append_query_results([[
                    maplit::btreemap! { "slug" => sea_orm::Value::from("rust") },
                ]])
                .append_query_results([[created.clone()]]),
        );

        let category = service
            .create(
                &staff(),
                CreateCategoryInput {
                    name: "Rust!".to_string(),
                    slug: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(category, created);
    }

    #[tokio::test]
    async fn test_create_with_taken_explicit_slug_is_conflict() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<category::Model>::new()])
                .append_query_results([[
                    maplit::btreemap! { "slug" => sea_orm::Value::from("news") },
                ]]),
        );

        let result = service
            .create(
                &staff(),
                CreateCategoryInput {
                    name: "Announcements".to_string(),
                    slug: Some("news".to_string()),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_list_active_page() {
        let items = vec![
            create_test_category("cat1", "Rust", "rust"),
            create_test_category("cat2", "Go", "go"),
        ];
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(2))
                }]])
                .append_query_results([items.clone()]),
        );

        let page = service.list(PageRequest::default()).await.unwrap();

        assert_eq!(page.items, items);
        assert_eq!(page.total, 2);
        assert!(!page.has_next);
    }
}
