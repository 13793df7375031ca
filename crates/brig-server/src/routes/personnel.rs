//! Users, roles, timesheets, and the staff spreadsheet import.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use brig_core::entities::{NewRole, NewUser, NewWorkTime, Role, User, WorkTime};
use brig_core::responses::StatusResponse;
use brig_db::updates::user::UserUpdate;
use brig_db::updates::work_time::WorkTimeUpdate;
use serde::Deserialize;

use super::uploaded_rows;
use crate::error::ApiError;
use crate::extract::{CurrentActor, Payload};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/import_excel", post(import_users))
        .route("/users/:id", get(show_user).patch(update_user).delete(destroy_user))
        .route("/roles", get(list_roles).post(create_role))
        .route("/roles/:id", delete(destroy_role))
        .route("/worktimes", get(list_work_times).post(create_work_time))
        .route(
            "/worktimes/:id",
            get(show_work_time).patch(update_work_time).delete(destroy_work_time),
        )
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.service().await.list_users().await?))
}

async fn create_user(
    State(state): State<AppState>,
    actor: CurrentActor,
    Payload(new): Payload<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.service().await.create_user(actor.get(), new).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn show_user(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<User>, ApiError> {
    Ok(Json(state.service().await.get_user(id).await?))
}

async fn update_user(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
    Payload(update): Payload<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .service()
        .await
        .update_user(actor.get(), id, update)
        .await?;
    Ok(Json(user))
}

async fn destroy_user(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service().await.delete_user(actor.get(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn import_users(
    State(state): State<AppState>,
    actor: CurrentActor,
    form: Multipart,
) -> Result<Json<StatusResponse>, ApiError> {
    let rows = uploaded_rows(form).await?;
    state
        .service()
        .await
        .import_users(actor.get(), &rows)
        .await
        .map_err(ApiError::import_failed)?;
    Ok(Json(StatusResponse::ok()))
}

async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>, ApiError> {
    Ok(Json(state.service().await.list_roles().await?))
}

async fn create_role(
    State(state): State<AppState>,
    actor: CurrentActor,
    Payload(new): Payload<NewRole>,
) -> Result<(StatusCode, Json<Role>), ApiError> {
    let role = state.service().await.create_role(actor.get(), new).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

async fn destroy_role(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service().await.delete_role(actor.get(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
struct WorkTimeQuery {
    user: Option<i64>,
}

async fn list_work_times(
    State(state): State<AppState>,
    Query(query): Query<WorkTimeQuery>,
) -> Result<Json<Vec<WorkTime>>, ApiError> {
    Ok(Json(state.service().await.list_work_times(query.user).await?))
}

async fn create_work_time(
    State(state): State<AppState>,
    actor: CurrentActor,
    Payload(new): Payload<NewWorkTime>,
) -> Result<(StatusCode, Json<WorkTime>), ApiError> {
    let entry = state
        .service()
        .await
        .create_work_time(actor.get(), new)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn show_work_time(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<WorkTime>, ApiError> {
    Ok(Json(state.service().await.get_work_time(id).await?))
}

async fn update_work_time(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
    Payload(update): Payload<WorkTimeUpdate>,
) -> Result<Json<WorkTime>, ApiError> {
    let entry = state
        .service()
        .await
        .update_work_time(actor.get(), id, update)
        .await?;
    Ok(Json(entry))
}

async fn destroy_work_time(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service().await.delete_work_time(actor.get(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
