//! Post service.

use std::sync::Arc;

use quill_common::{AppError, AppResult, BlogConfig, ClockService, IdGenerator};
use quill_db::entities::post::PostStatus;
use quill_db::entities::{post, tag};
use quill_db::repositories::{
    self, CategoryRepository, PostFilter, PostRepository, Scope, TagRepository,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, Set};
use serde::{Deserialize, Deserializer};
use validator::Validate;

use super::pagination::{Page, PageRequest};
use super::slug::{allocate_slug, slugify};
use super::visibility::{Actor, VisibilityPolicy};

/// Column width of `post.title` and `post.slug`.
pub const TITLE_MAX_LEN: usize = 50;
const MAX_PAGE_SIZE: u64 = 50;

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 50))]
    pub title: String,

    /// Derived from the title when absent.
    #[validate(length(min = 1, max = 50))]
    pub slug: Option<String>,

    #[validate(length(min = 1))]
    pub content: String,

    pub status: Option<PostStatus>,

    /// Category slug.
    pub category: Option<String>,

    /// Tag slugs.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Input for updating a post. Absent fields are left alone.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostInput {
    #[validate(length(min = 1, max = 50))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub content: Option<String>,

    pub status: Option<PostStatus>,

    /// `Some(None)` detaches the category.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub category: Option<Option<String>>,

    pub tags: Option<Vec<String>>,
}

fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A post with its active tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetail {
    pub post: post::Model,
    pub tags: Vec<tag::Model>,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    db: Arc<DatabaseConnection>,
    post_repo: PostRepository,
    category_repo: CategoryRepository,
    tag_repo: TagRepository,
    clock: ClockService,
    id_gen: IdGenerator,
    page_size: u64,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, clock: ClockService, blog: &BlogConfig) -> Self {
        Self {
            post_repo: PostRepository::new(Arc::clone(&db)),
            category_repo: CategoryRepository::new(Arc::clone(&db)),
            tag_repo: TagRepository::new(Arc::clone(&db)),
            db,
            clock,
            id_gen: IdGenerator::new(),
            page_size: blog.post_page_size,
        }
    }

    /// Create a post authored by `author_id`.
    ///
    /// Slug allocation, tag resolution and the insert share one transaction.
    pub async fn create(&self, author_id: &str, input: CreatePostInput) -> AppResult<PostDetail> {
        input.validate()?;

        let category_id = match input.category.as_deref() {
            Some(slug) => Some(self.resolve_category(slug).await?),
            None => None,
        };

        let base = match input.slug.as_deref() {
            Some(slug) => slugify(slug, TITLE_MAX_LEN),
            None => slugify(&input.title, TITLE_MAX_LEN),
        };
        let base = if base.is_empty() { "post".to_string() } else { base };

        let txn = repositories::begin(&self.db).await?;

        let tags = resolve_tags(&txn, &input.tags).await?;

        PostRepository::lock_slug(&txn, &base).await?;
        let conn = &txn;
        let slug = allocate_slug(&base, TITLE_MAX_LEN, move |candidates| {
            PostRepository::taken_slugs(conn, candidates)
        })
        .await?;

        let now = self.clock.now_fixed();
        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            slug: Set(slug),
            content: Set(input.content),
            author_id: Set(author_id.to_string()),
            status: Set(input.status.unwrap_or(PostStatus::Draft)),
            category_id: Set(category_id),
            created_at: Set(now),
            updated_at: Set(now),
            created_by: Set(Some(author_id.to_string())),
            updated_by: Set(Some(author_id.to_string())),
            is_deleted: Set(false),
            deleted_at: Set(None),
        };

        let post = PostRepository::insert(&txn, model).await?;
        let tag_ids: Vec<String> = tags.iter().map(|t| t.id.clone()).collect();
        TagRepository::replace_for_post(&txn, &post.id, &tag_ids).await?;
        repositories::commit(txn).await?;

        tracing::info!(post_id = %post.id, slug = %post.slug, status = post.status.as_str(), "Post created");

        Ok(PostDetail { post, tags })
    }

    /// Update a post. Only the author or staff may do so.
    pub async fn update(
        &self,
        slug: &str,
        actor: &Actor,
        input: UpdatePostInput,
    ) -> AppResult<PostDetail> {
        input.validate()?;

        let post = self.get_visible(slug, actor).await?;
        if !actor.can_modify(&post.author_id) {
            return Err(AppError::Forbidden("Not the post author".to_string()));
        }

        let category_id = match input.category {
            Some(Some(ref slug)) => Some(Some(self.resolve_category(slug).await?)),
            Some(None) => Some(None),
            None => None,
        };

        let txn = repositories::begin(&self.db).await?;

        let mut active: post::ActiveModel = post.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(category_id) = category_id {
            active.category_id = Set(category_id);
        }
        active.updated_at = Set(self.clock.now_fixed());
        active.updated_by = Set(actor.user_id().map(ToString::to_string));

        let post = PostRepository::update(&txn, active).await?;

        if let Some(slugs) = input.tags {
            let tags = resolve_tags(&txn, &slugs).await?;
            let tag_ids: Vec<String> = tags.iter().map(|t| t.id.clone()).collect();
            TagRepository::replace_for_post(&txn, &post.id, &tag_ids).await?;
        }

        repositories::commit(txn).await?;

        tracing::info!(post_id = %post.id, "Post updated");

        self.with_tags(post).await
    }

    /// Get a post by slug as seen by `actor`.
    pub async fn get_by_slug(&self, slug: &str, actor: &Actor) -> AppResult<PostDetail> {
        let post = self.get_visible(slug, actor).await?;
        self.with_tags(post).await
    }

    /// Get an active post by slug after the visibility check, without tags.
    pub async fn get_visible(&self, slug: &str, actor: &Actor) -> AppResult<post::Model> {
        let post = self.get_active(slug).await?;
        VisibilityPolicy::ensure_post_visible(&post, actor)?;
        Ok(post)
    }

    /// Get an active post by slug with no visibility check.
    ///
    /// For callers that apply their own rule, such as the comment listing.
    pub async fn get_active(&self, slug: &str) -> AppResult<post::Model> {
        self.post_repo.get_active_by_slug(slug).await
    }

    /// Get an active post by ID as seen by `actor`.
    pub async fn get_by_id(&self, id: &str, actor: &Actor) -> AppResult<post::Model> {
        let post = self
            .post_repo
            .find_by_id(id, Scope::Active)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {id}")))?;
        VisibilityPolicy::ensure_post_visible(&post, actor)?;
        Ok(post)
    }

    /// List active posts.
    ///
    /// Published posts unless `filter.status` asks for drafts, which requires
    /// a signed-in actor and shows only their own unless they are staff.
    pub async fn list(
        &self,
        actor: &Actor,
        mut filter: PostFilter,
        request: PageRequest,
    ) -> AppResult<Page<post::Model>> {
        match filter.status {
            Some(PostStatus::Draft) if !actor.is_authenticated() => {
                return Err(AppError::Forbidden(
                    "Authentication required to view drafts".to_string(),
                ));
            }
            // Drafts are listed to their author and to staff only
            Some(PostStatus::Draft) if !actor.is_staff() => {
                filter.author_id = actor.user_id().map(ToString::to_string);
            }
            Some(PostStatus::Draft) => {}
            _ => filter.status = Some(PostStatus::Published),
        }

        let (page, limit, offset) = request.resolve(self.page_size, MAX_PAGE_SIZE);
        let total = self.post_repo.count_page(&filter).await?;
        let items = self.post_repo.find_page(&filter, limit, offset).await?;

        Ok(Page::new(items, total, page, limit))
    }

    async fn with_tags(&self, post: post::Model) -> AppResult<PostDetail> {
        let tags = self.tag_repo.find_for_post(&post.id).await?;
        Ok(PostDetail { post, tags })
    }

    async fn resolve_category(&self, slug: &str) -> AppResult<String> {
        self.category_repo
            .find_by_slug(slug, Scope::Active)
            .await?
            .map(|c| c.id)
            .ok_or_else(|| AppError::Validation(format!("Unknown category: {slug}")))
    }
}

async fn resolve_tags<C: ConnectionTrait>(
    conn: &C,
    slugs: &[String],
) -> AppResult<Vec<tag::Model>> {
    let mut wanted = slugs.to_vec();
    wanted.sort();
    wanted.dedup();

    let tags = TagRepository::find_active_by_slugs(conn, &wanted).await?;
    if let Some(missing) = wanted
        .iter()
        .find(|slug| !tags.iter().any(|t| &t.slug == *slug))
    {
        return Err(AppError::Validation(format!("Unknown tag: {missing}")));
    }

    Ok(tags)
}
