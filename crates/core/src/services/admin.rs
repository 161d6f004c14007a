//! Staff views over deleted and active rows alike, and the deletion gate.

use std::sync::Arc;

use quill_common::{AppError, AppResult, ClockService};
use quill_db::entities::{Category, Comment, Post, Tag, User, category, comment, post, tag, user};
use quill_db::repositories::{Scope, scope};
use quill_db::SoftDeletable;
use sea_orm::DatabaseConnection;

use super::category::require_staff;
use super::lifecycle::{EntityKind, EntityRef, SoftDeleteLifecycle, Transition};
use super::pagination::{Page, PageRequest};
use super::visibility::Actor;

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 200;

/// A row of any kind, as seen in the all-inclusive view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    User(user::Model),
    Post(post::Model),
    Category(category::Model),
    Tag(tag::Model),
    Comment(comment::Model),
}

/// Deletion, restore and audit listing across kinds.
#[derive(Clone)]
pub struct AdminService {
    db: Arc<DatabaseConnection>,
    lifecycle: SoftDeleteLifecycle,
}

impl AdminService {
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, clock: ClockService) -> Self {
        Self {
            lifecycle: SoftDeleteLifecycle::new(Arc::clone(&db), clock),
            db,
        }
    }

    /// Every row of `kind`, deleted ones included, ordered by ID. Staff only.
    pub async fn list_all_including_deleted(
        &self,
        actor: &Actor,
        kind: EntityKind,
        request: PageRequest,
    ) -> AppResult<Page<Record>> {
        require_staff(actor)?;

        let (page, limit, offset) = request.resolve(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);

        let (items, total) = match kind {
            EntityKind::User => self.all_of::<User>(limit, offset, Record::User).await?,
            EntityKind::Post => self.all_of::<Post>(limit, offset, Record::Post).await?,
            EntityKind::Category => {
                self.all_of::<Category>(limit, offset, Record::Category)
                    .await?
            }
            EntityKind::Tag => self.all_of::<Tag>(limit, offset, Record::Tag).await?,
            EntityKind::Comment => {
                self.all_of::<Comment>(limit, offset, Record::Comment)
                    .await?
            }
        };

        tracing::debug!(kind = %kind, page, count = items.len(), "Admin listing");

        Ok(Page::new(items, total, page, limit))
    }

    async fn all_of<E>(
        &self,
        limit: u64,
        offset: u64,
        wrap: fn(E::Model) -> Record,
    ) -> AppResult<(Vec<Record>, u64)>
    where
        E: SoftDeletable,
        E::Model: Sync,
    {
        let total = scope::count::<E, _>(self.db.as_ref(), Scope::All).await?;
        let rows = scope::list::<E, _>(self.db.as_ref(), Scope::All, limit, offset).await?;
        Ok((rows.into_iter().map(wrap).collect(), total))
    }

    /// Soft delete `target` on behalf of `actor`.
    ///
    /// Posts and comments may be deleted by their author or staff; users,
    /// categories and tags by staff only.
    pub async fn delete(&self, actor: &Actor, target: &EntityRef) -> AppResult<Transition> {
        self.authorize_delete(actor, target).await?;
        self.lifecycle.soft_delete(target, actor.user_id()).await
    }

    /// Restore `target`. Staff only.
    pub async fn restore(&self, actor: &Actor, target: &EntityRef) -> AppResult<Transition> {
        let actor_id = require_staff(actor)?;
        self.lifecycle.restore(target, Some(actor_id)).await
    }

    async fn authorize_delete(&self, actor: &Actor, target: &EntityRef) -> AppResult<()> {
        if !actor.is_authenticated() {
            return Err(AppError::Unauthorized);
        }
        if actor.is_staff() {
            return Ok(());
        }

        let author_id = match target.kind {
            EntityKind::Post => scope::find_by_id::<Post, _>(self.db.as_ref(), &target.id, Scope::All)
                .await?
                .map(|p| p.author_id),
            EntityKind::Comment => {
                scope::find_by_id::<Comment, _>(self.db.as_ref(), &target.id, Scope::All)
                    .await?
                    .map(|c| c.author_id)
            }
            EntityKind::User | EntityKind::Category | EntityKind::Tag => {
                return Err(AppError::Forbidden("Staff only".to_string()));
            }
        };

        match author_id {
            Some(author_id) if actor.can_modify(&author_id) => Ok(()),
            Some(_) => Err(AppError::Forbidden(format!(
                "Not the author of {} {}",
                target.kind, target.id
            ))),
            None => Err(AppError::NotFound(format!("{} {}", target.kind, target.id))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quill_common::SystemClock;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_comment(author_id: &str, is_deleted: bool) -> comment::Model {
        let now = Utc::now().into();
        comment::Model {
            id: "c1".to_string(),
            post_id: "post1".to_string(),
            author_id: author_id.to_string(),
            content: "hello".to_string(),
            parent_id: None,
            depth: 0,
            created_at: now,
            updated_at: now,
            created_by: Some(author_id.to_string()),
            updated_by: None,
            is_deleted,
            deleted_at: is_deleted.then_some(now),
        }
    }

    fn member(id: &str) -> Actor {
        Actor::Authenticated {
            user_id: id.to_string(),
            is_staff: false,
        }
    }

    fn staff() -> Actor {
        Actor::Authenticated {
            user_id: "admin".to_string(),
            is_staff: true,
        }
    }

    fn service(db: MockDatabase) -> AdminService {
        AdminService::new(Arc::new(db.into_connection()), Arc::new(SystemClock))
    }

    #[tokio::test]
    async fn test_listing_requires_staff() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .list_all_including_deleted(&member("u1"), EntityKind::Comment, PageRequest::default())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_listing_includes_deleted_rows() {
        let live = create_test_comment("u1", false);
        let mut gone = create_test_comment("u1", true);
        gone.id = "c2".to_string();
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(2))
                }]])
                .append_query_results([[live.clone(), gone.clone()]]),
        );

        let page = service
            .list_all_including_deleted(&staff(), EntityKind::Comment, PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.items, vec![Record::Comment(live), Record::Comment(gone)]);
    }

    #[tokio::test]
    async fn test_author_deletes_own_comment() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("u1", false)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }]),
        );

        let transition = service
            .delete(&member("u1"), &EntityRef::new(EntityKind::Comment, "c1"))
            .await
            .unwrap();

        assert_eq!(transition, Transition::Applied);
    }

    #[tokio::test]
    async fn test_stranger_cannot_delete_comment() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("u1", false)]]),
        );

        let result = service
            .delete(&member("u2"), &EntityRef::new(EntityKind::Comment, "c1"))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_member_cannot_delete_tag() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .delete(&member("u1"), &EntityRef::new(EntityKind::Tag, "tag1"))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_anonymous_cannot_delete() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .delete(&Actor::Anonymous, &EntityRef::new(EntityKind::Post, "post1"))
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_restore_is_staff_only() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .restore(&member("u1"), &EntityRef::new(EntityKind::Comment, "c1"))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
