//! Comment threads on projects and materials.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use brig_core::entities::{Comment, CommentNode, NewComment};
use brig_db::repos::comment::CommentFilter;
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::{CurrentActor, Payload};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/comments", get(list).post(create))
        .route("/comments/:id", get(show).delete(destroy))
}

#[derive(Debug, Default, Deserialize)]
struct ThreadQuery {
    project: Option<i64>,
    material: Option<i64>,
}

/// Top-level comments with their nested replies.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ThreadQuery>,
) -> Result<Json<Vec<CommentNode>>, ApiError> {
    let filter = CommentFilter {
        project_id: query.project,
        material_id: query.material,
    };
    Ok(Json(state.service().await.list_comment_threads(filter).await?))
}

/// The author is always the caller; anonymous posts are refused.
async fn create(
    State(state): State<AppState>,
    actor: CurrentActor,
    Payload(new): Payload<NewComment>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let author = actor.required()?;
    let comment = state.service().await.create_comment(author, new).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Comment>, ApiError> {
    Ok(Json(state.service().await.get_comment(id).await?))
}

async fn destroy(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service().await.delete_comment(actor.get(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
