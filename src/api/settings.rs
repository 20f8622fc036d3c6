use axum::Json;
use axum::extract::{Path, State};
use serde_json::Value;

use crate::access::{Actor, Role};
use crate::db::repository;
use crate::error::AppError;
use crate::models::Setting;
use crate::state::AppState;

pub async fn get_one(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Setting>, AppError> {
    let setting = repository::get_setting(&state.db, &key)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(setting))
}

pub async fn put_one(
    State(state): State<AppState>,
    actor: Actor,
    Path(key): Path<String>,
    Json(value): Json<Value>,
) -> Result<Json<Setting>, AppError> {
    actor.require(&[Role::SuperAdmin])?;
    let setting = repository::put_setting(&state.db, &key, value).await?;
    Ok(Json(setting))
}
