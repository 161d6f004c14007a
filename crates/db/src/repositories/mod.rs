//! Repository layer.
//!
//! Each repository wraps one table. Methods that must share a transaction
//! with other writes take the [`DatabaseTransaction`] explicitly; everything
//! else runs on the pooled connection.

pub mod category;
pub mod comment;
pub mod post;
pub mod scope;
pub mod tag;
pub mod user;

pub use category::CategoryRepository;
pub use comment::CommentRepository;
pub use post::{PostFilter, PostOrderField, PostOrdering, PostRepository};
pub use scope::Scope;
pub use tag::TagRepository;
pub use user::UserRepository;

use std::collections::HashSet;

use quill_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QuerySelect, TransactionTrait,
};

/// Open a transaction on the pool.
pub async fn begin(db: &DatabaseConnection) -> AppResult<DatabaseTransaction> {
    db.begin()
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Commit a transaction opened with [`begin`].
pub async fn commit(txn: DatabaseTransaction) -> AppResult<()> {
    txn.commit()
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// The `candidates` already present in `column`, deleted rows included.
///
/// Slugs stay unique across soft-deleted rows, so the all-inclusive view is
/// the one that matters here.
pub async fn taken_slugs<E, C>(
    conn: &C,
    column: E::Column,
    candidates: Vec<String>,
) -> AppResult<HashSet<String>>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if candidates.is_empty() {
        return Ok(HashSet::new());
    }

    let slugs: Vec<String> = E::find()
        .select_only()
        .column(column)
        .filter(column.is_in(candidates))
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(slugs.into_iter().collect())
}
