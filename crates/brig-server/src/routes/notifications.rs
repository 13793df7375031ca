use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use brig_core::entities::Notification;
use brig_core::responses::StatusResponse;
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::CurrentActor;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(inbox))
        .route("/notifications/:id/mark_read", post(mark_read))
}

#[derive(Debug, Default, Deserialize)]
struct InboxQuery {
    #[serde(default)]
    unread: bool,
}

async fn inbox(
    State(state): State<AppState>,
    actor: CurrentActor,
    Query(query): Query<InboxQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = state
        .service()
        .await
        .list_notifications(actor.get(), query.unread)
        .await?;
    Ok(Json(notifications))
}

async fn mark_read(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
) -> Result<Json<StatusResponse>, ApiError> {
    let reader = actor.required()?;
    state.service().await.mark_read(reader, id).await?;
    Ok(Json(StatusResponse::read()))
}
