use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use brig_core::entities::{NewProject, Project};
use brig_db::updates::project::ProjectUpdate;

use crate::error::ApiError;
use crate::extract::{CurrentActor, Payload};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list).post(create))
        .route("/projects/:id", get(show).patch(update).delete(destroy))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.service().await.list_projects().await?))
}

async fn create(
    State(state): State<AppState>,
    actor: CurrentActor,
    Payload(new): Payload<NewProject>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let project = state.service().await.create_project(actor.get(), new).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Project>, ApiError> {
    Ok(Json(state.service().await.get_project(id).await?))
}

async fn update(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
    Payload(update): Payload<ProjectUpdate>,
) -> Result<Json<Project>, ApiError> {
    let project = state
        .service()
        .await
        .update_project(actor.get(), id, update)
        .await?;
    Ok(Json(project))
}

async fn destroy(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service().await.delete_project(actor.get(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
