//! Soft delete and restore for every entity kind.
//!
//! One protocol serves users, posts, categories, tags and comments. A row is
//! either `Active` or `Deleted`; both transitions are idempotent and report
//! [`Transition::Unchanged`] when the row is already in the target state.
//! Restoring consults a per-kind guard first: a comment may only come back
//! while its post is active.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use quill_common::{AppError, AppResult, ClockService};
use quill_db::entities::{Category, Comment, Post, Tag, User};
use quill_db::repositories::{self, PostRepository, Scope, scope};
use quill_db::{Audited, SoftDeletable};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use serde::Serialize;

/// The five kinds of audited entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Post,
    Category,
    Tag,
    Comment,
}

impl EntityKind {
    pub const ALL: [Self; 5] = [
        Self::User,
        Self::Post,
        Self::Category,
        Self::Tag,
        Self::Comment,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => User::KIND,
            Self::Post => Post::KIND,
            Self::Category => Category::KIND,
            Self::Tag => Tag::KIND,
            Self::Comment => Comment::KIND,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown entity kind: {s}")))
    }
}

/// Reference to one row of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    #[must_use]
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// Outcome of a lifecycle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// The state changed.
    Applied,
    /// The row was already in the requested state.
    Unchanged,
}

/// Precondition checked before a row is restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RestoreGuard {
    Always,
    OwningPostActive,
}

const fn restore_guard(kind: EntityKind) -> RestoreGuard {
    match kind {
        EntityKind::Comment => RestoreGuard::OwningPostActive,
        EntityKind::User | EntityKind::Post | EntityKind::Category | EntityKind::Tag => {
            RestoreGuard::Always
        }
    }
}

/// Soft delete and restore service.
#[derive(Clone)]
pub struct SoftDeleteLifecycle {
    db: Arc<DatabaseConnection>,
    clock: ClockService,
}

impl SoftDeleteLifecycle {
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>, clock: ClockService) -> Self {
        Self { db, clock }
    }

    /// Mark a row deleted.
    ///
    /// Never fails for an existing row; a missing ID is `NotFound`.
    pub async fn soft_delete(
        &self,
        target: &EntityRef,
        actor_id: Option<&str>,
    ) -> AppResult<Transition> {
        let transition = match target.kind {
            EntityKind::User => self.soft_delete_as::<User>(&target.id, actor_id).await?,
            EntityKind::Post => self.soft_delete_as::<Post>(&target.id, actor_id).await?,
            EntityKind::Category => self.soft_delete_as::<Category>(&target.id, actor_id).await?,
            EntityKind::Tag => self.soft_delete_as::<Tag>(&target.id, actor_id).await?,
            EntityKind::Comment => self.soft_delete_as::<Comment>(&target.id, actor_id).await?,
        };

        if transition == Transition::Applied {
            tracing::info!(kind = %target.kind, id = %target.id, actor = ?actor_id, "Soft deleted");
        } else {
            tracing::debug!(kind = %target.kind, id = %target.id, "Already deleted");
        }

        Ok(transition)
    }

    /// Bring a deleted row back.
    ///
    /// Fails with `RestoreBlocked` when the kind's guard rejects, leaving the
    /// row deleted.
    pub async fn restore(
        &self,
        target: &EntityRef,
        actor_id: Option<&str>,
    ) -> AppResult<Transition> {
        let transition = match target.kind {
            EntityKind::User => self.restore_as::<User>(target, actor_id).await?,
            EntityKind::Post => self.restore_as::<Post>(target, actor_id).await?,
            EntityKind::Category => self.restore_as::<Category>(target, actor_id).await?,
            EntityKind::Tag => self.restore_as::<Tag>(target, actor_id).await?,
            EntityKind::Comment => self.restore_as::<Comment>(target, actor_id).await?,
        };

        if transition == Transition::Applied {
            tracing::info!(kind = %target.kind, id = %target.id, actor = ?actor_id, "Restored");
        } else {
            tracing::debug!(kind = %target.kind, id = %target.id, "Already active");
        }

        Ok(transition)
    }

    async fn soft_delete_as<E: SoftDeletable>(
        &self,
        id: &str,
        actor_id: Option<&str>,
    ) -> AppResult<Transition> {
        let now = self.clock.now_fixed();

        if scope::mark_deleted::<E, _>(self.db.as_ref(), id, now, actor_id).await? {
            return Ok(Transition::Applied);
        }

        match scope::find_by_id::<E, _>(self.db.as_ref(), id, Scope::All).await? {
            Some(_) => Ok(Transition::Unchanged),
            None => Err(AppError::NotFound(format!("{} {id}", E::KIND))),
        }
    }

    async fn restore_as<E>(&self, target: &EntityRef, actor_id: Option<&str>) -> AppResult<Transition>
    where
        E: SoftDeletable,
        E::Model: Audited,
    {
        let txn = repositories::begin(&self.db).await?;

        let row = scope::lock_by_id::<E, _>(&txn, &target.id, Scope::All, true)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", E::KIND, target.id)))?;

        if row.audit().is_active() {
            repositories::commit(txn).await?;
            return Ok(Transition::Unchanged);
        }

        check_restore_guard(&txn, target).await?;

        let now = self.clock.now_fixed();
        scope::mark_restored::<E, _>(&txn, &target.id, now, actor_id).await?;
        repositories::commit(txn).await?;

        Ok(Transition::Applied)
    }
}

async fn check_restore_guard<C: ConnectionTrait>(conn: &C, target: &EntityRef) -> AppResult<()> {
    match restore_guard(target.kind) {
        RestoreGuard::Always => Ok(()),
        RestoreGuard::OwningPostActive => {
            match PostRepository::lock_owner_of_comment(conn, &target.id).await? {
                Some(post) if !post.is_deleted => Ok(()),
                Some(post) => {
                    tracing::warn!(comment_id = %target.id, post_id = %post.id, "Restore blocked by deleted post");
                    Err(AppError::RestoreBlocked(format!(
                        "post {} is deleted",
                        post.id
                    )))
                }
                None => {
                    tracing::warn!(comment_id = %target.id, "Restore blocked, owning post missing");
                    Err(AppError::RestoreBlocked("owning post is missing".to_string()))
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quill_common::SystemClock;
    use quill_db::entities::{comment, post, user};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn updated(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn create_test_post(is_deleted: bool) -> post::Model {
        let now = Utc::now().into();
        post::Model {
            id: "post1".to_string(),
            title: "Post".to_string(),
            slug: "post".to_string(),
            content: "body".to_string(),
            author_id: "author".to_string(),
            status: post::PostStatus::Published,
            category_id: None,
            created_at: now,
            updated_at: now,
            created_by: Some("author".to_string()),
            updated_by: None,
            is_deleted,
            deleted_at: is_deleted.then_some(now),
        }
    }

    fn create_test_comment(is_deleted: bool) -> comment::Model {
        let now = Utc::now().into();
        comment::Model {
            id: "c1".to_string(),
            post_id: "post1".to_string(),
            author_id: "reader".to_string(),
            content: "hello".to_string(),
            parent_id: None,
            depth: 0,
            created_at: now,
            updated_at: now,
            created_by: Some("reader".to_string()),
            updated_by: None,
            is_deleted,
            deleted_at: is_deleted.then_some(now),
        }
    }

    fn lifecycle(db: MockDatabase) -> SoftDeleteLifecycle {
        SoftDeleteLifecycle::new(Arc::new(db.into_connection()), Arc::new(SystemClock))
    }

    #[test]
    fn test_kind_round_trips_through_name() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
        assert!(matches!(
            "note".parse::<EntityKind>(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_only_comments_have_a_restore_guard() {
        for kind in EntityKind::ALL {
            let expected = if kind == EntityKind::Comment {
                RestoreGuard::OwningPostActive
            } else {
                RestoreGuard::Always
            };
            assert_eq!(restore_guard(kind), expected);
        }
    }

    #[tokio::test]
    async fn test_soft_delete_applies_once() {
        let service = lifecycle(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([updated(1)]),
        );

        let result = service
            .soft_delete(&EntityRef::new(EntityKind::Post, "post1"), Some("author"))
            .await
            .unwrap();

        assert_eq!(result, Transition::Applied);
    }

    #[tokio::test]
    async fn test_soft_delete_twice_is_unchanged_not_error() {
        let service = lifecycle(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([updated(1), updated(0)])
                .append_query_results([[create_test_post(true)]]),
        );
        let target = EntityRef::new(EntityKind::Post, "post1");

        let first = service.soft_delete(&target, None).await.unwrap();
        let second = service.soft_delete(&target, None).await.unwrap();

        assert_eq!(first, Transition::Applied);
        assert_eq!(second, Transition::Unchanged);
    }

    #[tokio::test]
    async fn test_soft_delete_unknown_id_is_not_found() {
        let service = lifecycle(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([updated(0)])
                .append_query_results([Vec::<post::Model>::new()]),
        );

        let result = service
            .soft_delete(&EntityRef::new(EntityKind::Post, "missing"), None)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_restore_active_row_is_unchanged() {
        let service = lifecycle(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post(false)]]),
        );

        let result = service
            .restore(&EntityRef::new(EntityKind::Post, "post1"), None)
            .await
            .unwrap();

        assert_eq!(result, Transition::Unchanged);
    }

    #[tokio::test]
    async fn test_restore_comment_blocked_while_post_deleted() {
        // No exec result is queued: reaching the UPDATE would fail the test.
        let service = lifecycle(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment(true)]])
                .append_query_results([[create_test_post(true)]]),
        );

        let result = service
            .restore(&EntityRef::new(EntityKind::Comment, "c1"), Some("admin"))
            .await;

        assert!(matches!(result, Err(AppError::RestoreBlocked(_))));
    }

    #[tokio::test]
    async fn test_restore_post_then_comment_succeeds() {
        let service = lifecycle(
            MockDatabase::new(DatabaseBackend::Postgres)
                // restore comment while post deleted
                .append_query_results([[create_test_comment(true)]])
                .append_query_results([[create_test_post(true)]])
                // restore post
                .append_query_results([[create_test_post(true)]])
                // restore comment again
                .append_query_results([[create_test_comment(true)]])
                .append_query_results([[create_test_post(false)]])
                .append_exec_results([updated(1), updated(1)]),
        );
        let comment = EntityRef::new(EntityKind::Comment, "c1");

        assert!(matches!(
            service.restore(&comment, None).await,
            Err(AppError::RestoreBlocked(_))
        ));

        let post = service
            .restore(&EntityRef::new(EntityKind::Post, "post1"), None)
            .await
            .unwrap();
        assert_eq!(post, Transition::Applied);

        let comment = service.restore(&comment, None).await.unwrap();
        assert_eq!(comment, Transition::Applied);
    }

    #[tokio::test]
    async fn test_restore_unknown_id_is_not_found() {
        let service = lifecycle(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<comment::Model>::new()]),
        );

        let result = service
            .restore(&EntityRef::new(EntityKind::Comment, "missing"), None)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_restore_user_reactivates_login() {
        let now = Utc::now().into();
        let deleted = user::Model {
            id: "user1".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$hash".to_string(),
            token: "alice-token".to_string(),
            is_active: false,
            is_staff: false,
            is_superuser: false,
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
            is_deleted: true,
            deleted_at: Some(now),
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[deleted]])
                .append_exec_results([updated(1)])
                .into_connection(),
        );
        let service = SoftDeleteLifecycle::new(Arc::clone(&db), Arc::new(SystemClock));

        let transition = service
            .restore(&EntityRef::new(EntityKind::User, "user1"), Some("admin"))
            .await
            .unwrap();
        drop(service);

        assert_eq!(transition, Transition::Applied);
        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        let update = log
            .iter()
            .flat_map(|txn| txn.statements())
            .find(|stmt| stmt.sql.starts_with(r#"UPDATE "user""#))
            .unwrap();
        assert!(update.sql.contains(r#""is_active" = "#));
    }
}
