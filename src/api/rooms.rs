use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::access::{Actor, Role};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{NewRoomRequest, Room, UpdateRoomRequest};
use crate::services::catalog;
use crate::state::AppState;

const EDITORS: [Role; 2] = [Role::SuperAdmin, Role::TimetableIncharge];

#[derive(Deserialize)]
pub struct RoomQueryParams {
    building: Option<String>,
    status: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<RoomQueryParams>,
) -> Result<Json<Vec<Room>>, AppError> {
    let rooms = repository::fetch_rooms(
        &state.db,
        params.building.as_deref(),
        params.status.as_deref(),
    )
    .await?;
    Ok(Json(rooms))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Room>, AppError> {
    let room = repository::find_room_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(room))
}

pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<NewRoomRequest>,
) -> Result<(StatusCode, Json<Room>), AppError> {
    actor.require(&EDITORS)?;
    let room = catalog::create_room(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(req): Json<UpdateRoomRequest>,
) -> Result<Json<Room>, AppError> {
    actor.require(&EDITORS)?;
    let room = catalog::update_room(&state.db, &id, req).await?;
    Ok(Json(room))
}

pub async fn remove(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    actor.require(&EDITORS)?;
    let ok = repository::delete_room(&state.db, &id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
