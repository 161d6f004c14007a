//! Staff endpoints: audit listings over deleted rows, delete and restore.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use quill_common::AppResult;
use quill_core::{EntityKind, EntityRef, Page, PageRequest, Record, Transition};
use quill_db::{AuditFields, Audited};
use serde::Serialize;

use crate::{extractors::StaffUser, middleware::AppState, response::ApiResponse};

/// One row in the all-inclusive view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub kind: EntityKind,
    pub id: String,
    /// Username, title, name or comment body.
    pub label: String,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl From<Record> for RecordResponse {
    fn from(record: Record) -> Self {
        let (kind, audit) = match &record {
            Record::User(m) => (EntityKind::User, m.audit()),
            Record::Post(m) => (EntityKind::Post, m.audit()),
            Record::Category(m) => (EntityKind::Category, m.audit()),
            Record::Tag(m) => (EntityKind::Tag, m.audit()),
            Record::Comment(m) => (EntityKind::Comment, m.audit()),
        };
        let (id, label) = match record {
            Record::User(m) => (m.id, m.username),
            Record::Post(m) => (m.id, m.title),
            Record::Category(m) => (m.id, m.name),
            Record::Tag(m) => (m.id, m.name),
            Record::Comment(m) => (m.id, m.content),
        };
        Self {
            kind,
            id,
            label,
            audit,
        }
    }
}

/// Result of a delete or restore.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    pub kind: EntityKind,
    pub id: String,
    pub transition: Transition,
}

async fn list_all(
    staff: StaffUser,
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(request): Query<PageRequest>,
) -> AppResult<ApiResponse<Page<RecordResponse>>> {
    let kind: EntityKind = kind.parse()?;
    let page = state
        .admin_service
        .list_all_including_deleted(&staff.actor(), kind, request)
        .await?;
    Ok(ApiResponse::ok(page.map(RecordResponse::from)))
}

async fn delete(
    staff: StaffUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> AppResult<ApiResponse<TransitionResponse>> {
    let target = EntityRef::new(kind.parse()?, id);
    let transition = state.admin_service.delete(&staff.actor(), &target).await?;
    Ok(ApiResponse::ok(TransitionResponse {
        kind: target.kind,
        id: target.id,
        transition,
    }))
}

/// Restore a row. `409 RESTORE_BLOCKED` for a comment whose post is deleted.
async fn restore(
    staff: StaffUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> AppResult<ApiResponse<TransitionResponse>> {
    let target = EntityRef::new(kind.parse()?, id);
    let transition = state.admin_service.restore(&staff.actor(), &target).await?;
    Ok(ApiResponse::ok(TransitionResponse {
        kind: target.kind,
        id: target.id,
        transition,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/{kind}", get(list_all))
        .route("/admin/{kind}/{id}/delete", post(delete))
        .route("/admin/{kind}/{id}/restore", post(restore))
}
