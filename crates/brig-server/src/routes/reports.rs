use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use brig_core::entities::{NewReport, Report};

use crate::error::ApiError;
use crate::extract::{CurrentActor, Payload};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list).post(create))
        .route("/reports/:id", get(show).delete(destroy))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<Report>>, ApiError> {
    Ok(Json(state.service().await.list_reports().await?))
}

async fn create(
    State(state): State<AppState>,
    actor: CurrentActor,
    Payload(new): Payload<NewReport>,
) -> Result<(StatusCode, Json<Report>), ApiError> {
    let report = state.service().await.create_report(actor.get(), new).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Report>, ApiError> {
    Ok(Json(state.service().await.get_report(id).await?))
}

async fn destroy(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service().await.delete_report(actor.get(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
