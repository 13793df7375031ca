//! Materials, tools, their movement journals, and the material import.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use brig_core::entities::{
    Material, MaterialMovement, NewMaterial, NewMaterialMovement, NewTool, NewToolMovement, Tool,
    ToolMovement,
};
use brig_core::responses::StatusResponse;
use brig_db::updates::material::MaterialUpdate;
use brig_db::updates::tool::ToolUpdate;
use serde::Deserialize;

use super::uploaded_rows;
use crate::error::ApiError;
use crate::extract::{CurrentActor, Payload};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/materials", get(list_materials).post(create_material))
        .route("/materials/import_excel", post(import_materials))
        .route(
            "/materials/:id",
            get(show_material).patch(update_material).delete(destroy_material),
        )
        .route("/tools", get(list_tools).post(create_tool))
        .route("/tools/:id", get(show_tool).patch(update_tool).delete(destroy_tool))
        .route("/tool-movements", get(list_tool_movements).post(create_tool_movement))
        .route(
            "/material-movements",
            get(list_material_movements).post(create_material_movement),
        )
        .route("/material-movements/:id", get(show_material_movement))
}

#[derive(Debug, Default, Deserialize)]
struct MaterialQuery {
    #[serde(default)]
    low_stock: bool,
}

async fn list_materials(
    State(state): State<AppState>,
    Query(query): Query<MaterialQuery>,
) -> Result<Json<Vec<Material>>, ApiError> {
    let service = state.service().await;
    let materials = if query.low_stock {
        service.low_stock_materials().await?
    } else {
        service.list_materials().await?
    };
    Ok(Json(materials))
}

async fn create_material(
    State(state): State<AppState>,
    actor: CurrentActor,
    Payload(new): Payload<NewMaterial>,
) -> Result<(StatusCode, Json<Material>), ApiError> {
    let material = state.service().await.create_material(actor.get(), new).await?;
    Ok((StatusCode::CREATED, Json(material)))
}

async fn show_material(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Material>, ApiError> {
    Ok(Json(state.service().await.get_material(id).await?))
}

async fn update_material(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
    Payload(update): Payload<MaterialUpdate>,
) -> Result<Json<Material>, ApiError> {
    let material = state
        .service()
        .await
        .update_material(actor.get(), id, update)
        .await?;
    Ok(Json(material))
}

async fn destroy_material(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service().await.delete_material(actor.get(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn import_materials(
    State(state): State<AppState>,
    actor: CurrentActor,
    form: Multipart,
) -> Result<Json<StatusResponse>, ApiError> {
    let rows = uploaded_rows(form).await?;
    state
        .service()
        .await
        .import_materials(actor.get(), &rows)
        .await
        .map_err(ApiError::import_failed)?;
    Ok(Json(StatusResponse::ok()))
}

async fn list_tools(State(state): State<AppState>) -> Result<Json<Vec<Tool>>, ApiError> {
    Ok(Json(state.service().await.list_tools().await?))
}

async fn create_tool(
    State(state): State<AppState>,
    actor: CurrentActor,
    Payload(new): Payload<NewTool>,
) -> Result<(StatusCode, Json<Tool>), ApiError> {
    let tool = state.service().await.create_tool(actor.get(), new).await?;
    Ok((StatusCode::CREATED, Json(tool)))
}

async fn show_tool(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Tool>, ApiError> {
    Ok(Json(state.service().await.get_tool(id).await?))
}

async fn update_tool(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
    Payload(update): Payload<ToolUpdate>,
) -> Result<Json<Tool>, ApiError> {
    let tool = state
        .service()
        .await
        .update_tool(actor.get(), id, update)
        .await?;
    Ok(Json(tool))
}

async fn destroy_tool(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service().await.delete_tool(actor.get(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
struct ToolMovementQuery {
    tool: Option<i64>,
}

async fn list_tool_movements(
    State(state): State<AppState>,
    Query(query): Query<ToolMovementQuery>,
) -> Result<Json<Vec<ToolMovement>>, ApiError> {
    Ok(Json(state.service().await.list_tool_movements(query.tool).await?))
}

async fn create_tool_movement(
    State(state): State<AppState>,
    actor: CurrentActor,
    Payload(new): Payload<NewToolMovement>,
) -> Result<(StatusCode, Json<ToolMovement>), ApiError> {
    let movement = state
        .service()
        .await
        .create_tool_movement(actor.get(), new)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

#[derive(Debug, Default, Deserialize)]
struct MaterialMovementQuery {
    material: Option<i64>,
}

async fn list_material_movements(
    State(state): State<AppState>,
    Query(query): Query<MaterialMovementQuery>,
) -> Result<Json<Vec<MaterialMovement>>, ApiError> {
    Ok(Json(
        state
            .service()
            .await
            .list_material_movements(query.material)
            .await?,
    ))
}

async fn create_material_movement(
    State(state): State<AppState>,
    actor: CurrentActor,
    Payload(new): Payload<NewMaterialMovement>,
) -> Result<(StatusCode, Json<MaterialMovement>), ApiError> {
    let movement = state
        .service()
        .await
        .create_material_movement(actor.get(), new)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

async fn show_material_movement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MaterialMovement>, ApiError> {
    Ok(Json(state.service().await.get_material_movement(id).await?))
}
