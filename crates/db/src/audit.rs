//! Audit columns shared by every entity.
//!
//! Each table carries the same six columns: creation and modification
//! timestamps, the acting users, and the soft-delete flag with its timestamp.
//! [`Audited`] exposes them from a model as one [`AuditFields`] value and
//! [`SoftDeletable`] names the columns so the generic store operations in
//! [`crate::repositories::scope`] work for any entity kind.

use sea_orm::{EntityTrait, prelude::DateTimeWithTimeZone, sea_query::SimpleExpr};
use serde::Serialize;

/// Audit columns of a single row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFields {
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    /// Weak reference, nulled if the user row is ever removed.
    pub created_by: Option<String>,
    /// Last modifier only; no history is kept.
    pub updated_by: Option<String>,
    pub is_deleted: bool,
    /// Set exactly while `is_deleted` is true.
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl AuditFields {
    /// Whether the row is visible to default-scoped reads.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// Models that embed the audit columns.
pub trait Audited {
    /// Snapshot of the audit columns.
    fn audit(&self) -> AuditFields;
}

/// Entities that follow the soft-delete protocol.
pub trait SoftDeletable: EntityTrait {
    /// Lowercase kind name used in logs and errors.
    const KIND: &'static str;

    fn id_column() -> Self::Column;
    fn is_deleted_column() -> Self::Column;
    fn deleted_at_column() -> Self::Column;
    fn updated_at_column() -> Self::Column;
    fn updated_by_column() -> Self::Column;

    /// Extra assignments written in the same statement that marks a row deleted.
    fn soft_delete_side_effects() -> Vec<(Self::Column, SimpleExpr)> {
        Vec::new()
    }

    /// Extra assignments written in the same statement that restores a row.
    fn restore_side_effects() -> Vec<(Self::Column, SimpleExpr)> {
        Vec::new()
    }
}
