//! Scoped views and soft-delete writes shared by every audited table.
//!
//! Reads state their intent explicitly through [`Scope`]: `Active` hides
//! soft-deleted rows, `All` returns them too (restore checks, admin audit).
//! The two write helpers are single conditional `UPDATE` statements, so the
//! flag and its timestamp always change together.

use quill_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, UpdateMany,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, SimpleExpr},
};

use crate::audit::SoftDeletable;

/// Which rows a read may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Only rows that are not soft-deleted.
    #[default]
    Active,
    /// Every row regardless of deletion state.
    All,
}

impl Scope {
    /// Restrict a select to this scope.
    #[must_use]
    pub fn apply<E: SoftDeletable>(self, select: Select<E>) -> Select<E> {
        match self {
            Self::Active => select.filter(E::is_deleted_column().eq(false)),
            Self::All => select,
        }
    }
}

/// Find a row by ID within a scope.
pub async fn find_by_id<E, C>(conn: &C, id: &str, scope: Scope) -> AppResult<Option<E::Model>>
where
    E: SoftDeletable,
    C: ConnectionTrait,
{
    scope
        .apply(E::find().filter(E::id_column().eq(id)))
        .one(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Find a row by ID and hold a row lock until the surrounding transaction ends.
///
/// `exclusive` takes `FOR UPDATE`; otherwise `FOR SHARE`, which keeps the row
/// from changing while still allowing other readers to lock it.
pub async fn lock_by_id<E, C>(
    conn: &C,
    id: &str,
    scope: Scope,
    exclusive: bool,
) -> AppResult<Option<E::Model>>
where
    E: SoftDeletable,
    C: ConnectionTrait,
{
    let select = scope.apply(E::find().filter(E::id_column().eq(id)));
    let select = if exclusive {
        select.lock_exclusive()
    } else {
        select.lock_shared()
    };

    select
        .one(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// List rows ordered by ID (insertion order).
pub async fn list<E, C>(conn: &C, scope: Scope, limit: u64, offset: u64) -> AppResult<Vec<E::Model>>
where
    E: SoftDeletable,
    C: ConnectionTrait,
{
    scope
        .apply(E::find())
        .order_by_asc(E::id_column())
        .limit(limit)
        .offset(offset)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Count rows within a scope.
pub async fn count<E, C>(conn: &C, scope: Scope) -> AppResult<u64>
where
    E: SoftDeletable,
    E::Model: Sync,
    C: ConnectionTrait,
{
    scope
        .apply(E::find())
        .count(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Move an active row to the deleted state.
///
/// Returns `false` when no active row matched (already deleted or missing).
pub async fn mark_deleted<E, C>(
    conn: &C,
    id: &str,
    now: DateTimeWithTimeZone,
    actor_id: Option<&str>,
) -> AppResult<bool>
where
    E: SoftDeletable,
    C: ConnectionTrait,
{
    let result = soft_delete_statement::<E>(id, now, actor_id)
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let changed = result.rows_affected > 0;
    if changed {
        tracing::debug!(kind = E::KIND, id = %id, "Row marked deleted");
    }
    Ok(changed)
}

/// Move a deleted row back to the active state.
///
/// Returns `false` when no deleted row matched (already active or missing).
pub async fn mark_restored<E, C>(
    conn: &C,
    id: &str,
    now: DateTimeWithTimeZone,
    actor_id: Option<&str>,
) -> AppResult<bool>
where
    E: SoftDeletable,
    C: ConnectionTrait,
{
    let result = restore_statement::<E>(id, now, actor_id)
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let changed = result.rows_affected > 0;
    if changed {
        tracing::debug!(kind = E::KIND, id = %id, "Row marked restored");
    }
    Ok(changed)
}

/// `UPDATE … SET is_deleted = TRUE, deleted_at = now … WHERE id = ? AND is_deleted = FALSE`
#[must_use]
pub fn soft_delete_statement<E: SoftDeletable>(
    id: &str,
    now: DateTimeWithTimeZone,
    actor_id: Option<&str>,
) -> UpdateMany<E> {
    let mut assignments: Vec<(E::Column, SimpleExpr)> = vec![
        (E::is_deleted_column(), Expr::value(true)),
        (E::deleted_at_column(), Expr::value(now)),
    ];
    assignments.extend(E::soft_delete_side_effects());

    transition_statement::<E>(id, true, assignments, now, actor_id)
}

/// `UPDATE … SET is_deleted = FALSE, deleted_at = NULL … WHERE id = ? AND is_deleted = TRUE`
#[must_use]
pub fn restore_statement<E: SoftDeletable>(
    id: &str,
    now: DateTimeWithTimeZone,
    actor_id: Option<&str>,
) -> UpdateMany<E> {
    let mut assignments: Vec<(E::Column, SimpleExpr)> = vec![
        (E::is_deleted_column(), Expr::value(false)),
        (
            E::deleted_at_column(),
            Expr::value(Option::<DateTimeWithTimeZone>::None),
        ),
    ];
    assignments.extend(E::restore_side_effects());

    transition_statement::<E>(id, false, assignments, now, actor_id)
}

fn transition_statement<E: SoftDeletable>(
    id: &str,
    from_active: bool,
    assignments: Vec<(E::Column, SimpleExpr)>,
    now: DateTimeWithTimeZone,
    actor_id: Option<&str>,
) -> UpdateMany<E> {
    let mut update = E::update_many().col_expr(E::updated_at_column(), Expr::value(now));

    if let Some(actor_id) = actor_id {
        update = update.col_expr(E::updated_by_column(), Expr::value(actor_id.to_string()));
    }

    for (column, expr) in assignments {
        update = update.col_expr(column, expr);
    }

    update
        .filter(E::id_column().eq(id))
        .filter(E::is_deleted_column().eq(!from_active))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::{Category, Comment, User, category};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait};

    fn create_test_category(id: &str, is_deleted: bool) -> category::Model {
        let now = Utc::now().into();
        category::Model {
            id: id.to_string(),
            name: format!("Category {id}"),
            slug: format!("category-{id}"),
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
            is_deleted,
            deleted_at: is_deleted.then_some(now),
        }
    }

    #[test]
    fn test_active_scope_filters_deleted_rows() {
        let sql = Scope::Active
            .apply(Comment::find())
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""comment"."is_deleted" = FALSE"#));
    }

    #[test]
    fn test_all_scope_leaves_query_untouched() {
        let sql = Scope::All
            .apply(Comment::find())
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(!sql.contains("is_deleted"));
    }

    #[tokio::test]
    async fn test_find_by_id_returns_deleted_row_in_all_scope() {
        let deleted = create_test_category("cat1", true);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[deleted.clone()]])
            .into_connection();

        let found = find_by_id::<Category, _>(&db, "cat1", Scope::All)
            .await
            .unwrap();

        assert_eq!(found, Some(deleted));
    }

    #[tokio::test]
    async fn test_mark_deleted_reports_change() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let changed = mark_deleted::<Category, _>(&db, "cat1", Utc::now().into(), Some("admin"))
            .await
            .unwrap();

        assert!(changed);
    }

    #[tokio::test]
    async fn test_mark_deleted_on_deleted_row_is_noop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let changed = mark_deleted::<Category, _>(&db, "cat1", Utc::now().into(), None)
            .await
            .unwrap();

        assert!(!changed);
    }

    #[test]
    fn test_user_soft_delete_disables_login_in_same_statement() {
        let sql = soft_delete_statement::<User>("user1", Utc::now().into(), None)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.starts_with(r#"UPDATE "user" SET"#));
        assert!(sql.contains(r#""is_deleted" = TRUE"#));
        assert!(sql.contains(r#""is_active" = FALSE"#));
        assert!(sql.contains(r#""user"."is_deleted" = FALSE"#));
    }

    #[test]
    fn test_category_soft_delete_has_no_side_effects() {
        let sql = soft_delete_statement::<Category>("cat1", Utc::now().into(), Some("admin"))
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(!sql.contains("is_active"));
        assert!(sql.contains(r#""updated_by" = 'admin'"#));
    }

    #[test]
    fn test_restore_statement_clears_deleted_at() {
        let sql = restore_statement::<Category>("cat1", Utc::now().into(), None)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""is_deleted" = FALSE"#));
        assert!(sql.contains(r#""deleted_at" = NULL"#));
        assert!(sql.contains(r#""category"."is_deleted" = TRUE"#));
        assert!(!sql.contains("updated_by"));
        assert!(!sql.contains("is_active"));
    }

    #[test]
    fn test_user_restore_reenables_login_in_same_statement() {
        let sql = restore_statement::<User>("user1", Utc::now().into(), Some("admin"))
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""is_deleted" = FALSE"#));
        assert!(sql.contains(r#""is_active" = TRUE"#));
        assert!(sql.contains(r#""user"."is_deleted" = TRUE"#));
    }

    #[tokio::test]
    async fn test_mark_restored_reports_change() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let changed = mark_restored::<Category, _>(&db, "cat1", Utc::now().into(), None)
            .await
            .unwrap();

        assert!(changed);
    }

    #[tokio::test]
    async fn test_count_active() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(4))
            }]])
            .into_connection();

        let total = count::<Category, _>(&db, Scope::Active).await.unwrap();

        assert_eq!(total, 4);
    }
}
