//! Post repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::post::PostStatus;
use crate::entities::{
    Category, Post, PostTag, Tag, User, category, comment, post, post_tag, tag, user,
};
use crate::repositories::scope::{self, Scope};
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbBackend,
    EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Select, Statement,
    sea_query::{Expr, JoinType, Query, extension::postgres::PgExpr},
};

/// Column a post listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostOrderField {
    #[default]
    Id,
    Title,
    CreatedAt,
}

/// Sort order of a post listing. Ties fall back to ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PostOrdering {
    pub field: PostOrderField,
    pub descending: bool,
}

impl PostOrdering {
    /// Parse `id`, `title` or `created_at`, with a leading `-` for descending.
    ///
    /// Returns `None` for any other field.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (descending, name) = match value.strip_prefix('-') {
            Some(name) => (true, name),
            None => (false, value),
        };
        let field = match name {
            "id" => PostOrderField::Id,
            "title" => PostOrderField::Title,
            "created_at" => PostOrderField::CreatedAt,
            _ => return None,
        };
        Some(Self { field, descending })
    }

    fn apply(self, select: Select<Post>) -> Select<Post> {
        let column = match self.field {
            PostOrderField::Id => post::Column::Id,
            PostOrderField::Title => post::Column::Title,
            PostOrderField::CreatedAt => post::Column::CreatedAt,
        };
        let order = if self.descending {
            Order::Desc
        } else {
            Order::Asc
        };

        let select = select.order_by(column, order);
        if self.field == PostOrderField::Id {
            select
        } else {
            select.order_by_asc(post::Column::Id)
        }
    }
}

/// Listing filters over active posts.
///
/// Category, tag and author are matched by slug or username against active
/// rows; `search` is a case-insensitive substring match on title or content.
/// `author_id` restricts to one author's posts by ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub author: Option<String>,
    pub author_id: Option<String>,
    pub search: Option<String>,
    pub ordering: PostOrdering,
}

impl PostFilter {
    fn select(&self) -> Select<Post> {
        let mut query = Scope::Active.apply(Post::find());

        if let Some(status) = self.status {
            query = query.filter(post::Column::Status.eq(status));
        }

        if let Some(slug) = &self.category {
            query = query.filter(
                post::Column::CategoryId.in_subquery(
                    Query::select()
                        .column((Category, category::Column::Id))
                        .from(Category)
                        .and_where(Expr::col((Category, category::Column::Slug)).eq(slug.as_str()))
                        .and_where(Expr::col((Category, category::Column::IsDeleted)).eq(false))
                        .to_owned(),
                ),
            );
        }

        if let Some(slug) = &self.tag {
            query = query.filter(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column((PostTag, post_tag::Column::PostId))
                        .from(PostTag)
                        .inner_join(
                            Tag,
                            Expr::col((Tag, tag::Column::Id))
                                .equals((PostTag, post_tag::Column::TagId)),
                        )
                        .and_where(Expr::col((Tag, tag::Column::Slug)).eq(slug.as_str()))
                        .and_where(Expr::col((Tag, tag::Column::IsDeleted)).eq(false))
                        .to_owned(),
                ),
            );
        }

        if let Some(author_id) = &self.author_id {
            query = query.filter(post::Column::AuthorId.eq(author_id.as_str()));
        }

        if let Some(username) = &self.author {
            query = query.filter(
                post::Column::AuthorId.in_subquery(
                    Query::select()
                        .column((User, user::Column::Id))
                        .from(User)
                        .and_where(Expr::col((User, user::Column::Username)).eq(username.as_str()))
                        .to_owned(),
                ),
            );
        }

        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", escape_like(term));
            query = query.filter(
                Condition::any()
                    .add(Expr::col((Post, post::Column::Title)).ilike(pattern.as_str()))
                    .add(Expr::col((Post, post::Column::Content)).ilike(pattern.as_str())),
            );
        }

        query
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID within a scope.
    pub async fn find_by_id(&self, id: &str, scope: Scope) -> AppResult<Option<post::Model>> {
        scope::find_by_id::<Post, _>(self.db.as_ref(), id, scope).await
    }

    /// Find a post by slug within a scope.
    pub async fn find_by_slug(&self, slug: &str, scope: Scope) -> AppResult<Option<post::Model>> {
        scope
            .apply(Post::find())
            .filter(post::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an active post by slug, returning an error if not found.
    pub async fn get_active_by_slug(&self, slug: &str) -> AppResult<post::Model> {
        self.find_by_slug(slug, Scope::Active)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {slug}")))
    }

    /// Lock an active post for the rest of the transaction.
    ///
    /// Shared lock: concurrent comment inserts proceed, a soft delete waits.
    pub async fn lock_active<C: ConnectionTrait>(conn: &C, id: &str) -> AppResult<post::Model> {
        scope::lock_by_id::<Post, _>(conn, id, Scope::Active, false)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {id}")))
    }

    /// The post owning a comment, deleted or not, under a shared lock.
    pub async fn lock_owner_of_comment<C: ConnectionTrait>(
        conn: &C,
        comment_id: &str,
    ) -> AppResult<Option<post::Model>> {
        Post::find()
            .join(JoinType::InnerJoin, post::Relation::Comments.def())
            .filter(comment::Column::Id.eq(comment_id))
            .lock_shared()
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Serialize slug allocation for one base until the transaction ends.
    ///
    /// Two posts titled alike would otherwise both see `base` as free.
    pub async fn lock_slug<C: ConnectionTrait>(conn: &C, base: &str) -> AppResult<()> {
        conn.execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT pg_advisory_xact_lock(hashtext($1))",
            [base.into()],
        ))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// The candidate slugs already taken.
    pub async fn taken_slugs<C: ConnectionTrait>(
        conn: &C,
        candidates: Vec<String>,
    ) -> AppResult<HashSet<String>> {
        super::taken_slugs::<Post, _>(conn, post::Column::Slug, candidates).await
    }

    /// Insert a post on the given connection or transaction.
    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        model: post::ActiveModel,
    ) -> AppResult<post::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post on the given connection or transaction.
    pub async fn update<C: ConnectionTrait>(
        conn: &C,
        model: post::ActiveModel,
    ) -> AppResult<post::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Page of active posts matching `filter`, in `filter.ordering`.
    pub async fn find_page(
        &self,
        filter: &PostFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        filter
            .ordering
            .apply(filter.select())
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count active posts matching `filter`.
    pub async fn count_page(&self, filter: &PostFilter) -> AppResult<u64> {
        filter
            .select()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List posts ordered by ID.
    pub async fn list(&self, scope: Scope, limit: u64, offset: u64) -> AppResult<Vec<post::Model>> {
        scope::list::<Post, _>(self.db.as_ref(), scope, limit, offset).await
    }

    /// Count posts within a scope.
    pub async fn count(&self, scope: Scope) -> AppResult<u64> {
        scope::count::<Post, _>(self.db.as_ref(), scope).await
    }
}
