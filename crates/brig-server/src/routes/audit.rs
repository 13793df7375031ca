//! Audit log listing and JSON-lines export.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use brig_core::entities::AuditLog;
use brig_core::enums::AuditAction;
use brig_db::repos::audit::AuditFilter;
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::CurrentActor;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auditlog", get(list))
        .route("/auditlog/export", get(export))
        .route("/auditlog/:id", get(show))
}

#[derive(Debug, Default, Deserialize)]
struct AuditQuery {
    search: Option<String>,
    action: Option<AuditAction>,
    object_type: Option<String>,
    object_id: Option<String>,
    actor: Option<i64>,
    limit: Option<u32>,
}

impl From<AuditQuery> for AuditFilter {
    fn from(query: AuditQuery) -> Self {
        Self {
            search: query.search,
            action: query.action,
            object_type: query.object_type,
            object_id: query.object_id,
            actor_id: query.actor,
            limit: query.limit,
        }
    }
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditLog>>, ApiError> {
    let filter = AuditFilter::from(query);
    Ok(Json(state.service().await.query_audit(&filter).await?))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<AuditLog>, ApiError> {
    Ok(Json(state.service().await.get_audit(id).await?))
}

/// Every matching entry as JSON lines; the export is itself audited.
async fn export(
    State(state): State<AppState>,
    actor: CurrentActor,
    Query(query): Query<AuditQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = AuditFilter::from(query);
    let mut body = Vec::new();
    state
        .service()
        .await
        .export_audit(actor.get(), &filter, &mut body)
        .await?;
    Ok(([(header::CONTENT_TYPE, "application/x-ndjson")], body))
}
