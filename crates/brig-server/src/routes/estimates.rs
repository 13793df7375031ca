//! Estimates and the work types inside them.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use brig_core::entities::{Estimate, NewEstimate, NewWorkType, WorkType};
use brig_db::updates::estimate::EstimateUpdate;
use brig_db::updates::work_type::WorkTypeUpdate;
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::{CurrentActor, Payload};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/estimates", get(list_estimates).post(create_estimate))
        .route(
            "/estimates/:id",
            get(show_estimate).patch(update_estimate).delete(destroy_estimate),
        )
        .route("/worktypes", get(list_work_types).post(create_work_type))
        .route(
            "/worktypes/:id",
            get(show_work_type).patch(update_work_type).delete(destroy_work_type),
        )
}

#[derive(Debug, Default, Deserialize)]
struct EstimateQuery {
    project: Option<i64>,
}

async fn list_estimates(
    State(state): State<AppState>,
    Query(query): Query<EstimateQuery>,
) -> Result<Json<Vec<Estimate>>, ApiError> {
    Ok(Json(state.service().await.list_estimates(query.project).await?))
}

async fn create_estimate(
    State(state): State<AppState>,
    actor: CurrentActor,
    Payload(new): Payload<NewEstimate>,
) -> Result<(StatusCode, Json<Estimate>), ApiError> {
    let estimate = state.service().await.create_estimate(actor.get(), new).await?;
    Ok((StatusCode::CREATED, Json(estimate)))
}

async fn show_estimate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Estimate>, ApiError> {
    Ok(Json(state.service().await.get_estimate(id).await?))
}

async fn update_estimate(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
    Payload(update): Payload<EstimateUpdate>,
) -> Result<Json<Estimate>, ApiError> {
    let estimate = state
        .service()
        .await
        .update_estimate(actor.get(), id, update)
        .await?;
    Ok(Json(estimate))
}

async fn destroy_estimate(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service().await.delete_estimate(actor.get(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
struct WorkTypeQuery {
    estimate: Option<i64>,
}

async fn list_work_types(
    State(state): State<AppState>,
    Query(query): Query<WorkTypeQuery>,
) -> Result<Json<Vec<WorkType>>, ApiError> {
    Ok(Json(state.service().await.list_work_types(query.estimate).await?))
}

async fn create_work_type(
    State(state): State<AppState>,
    actor: CurrentActor,
    Payload(new): Payload<NewWorkType>,
) -> Result<(StatusCode, Json<WorkType>), ApiError> {
    let work_type = state.service().await.create_work_type(actor.get(), new).await?;
    Ok((StatusCode::CREATED, Json(work_type)))
}

async fn show_work_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<WorkType>, ApiError> {
    Ok(Json(state.service().await.get_work_type(id).await?))
}

async fn update_work_type(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
    Payload(update): Payload<WorkTypeUpdate>,
) -> Result<Json<WorkType>, ApiError> {
    let work_type = state
        .service()
        .await
        .update_work_type(actor.get(), id, update)
        .await?;
    Ok(Json(work_type))
}

async fn destroy_work_type(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service().await.delete_work_type(actor.get(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
