use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::access::{Actor, Role};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{College, NewCollegeRequest, UpdateCollegeRequest};
use crate::state::AppState;

const ADMINS: [Role; 1] = [Role::SuperAdmin];

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<College>>, AppError> {
    let colleges = repository::fetch_colleges(&state.db).await?;
    Ok(Json(colleges))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<College>, AppError> {
    let college = repository::find_college_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(college))
}

pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<NewCollegeRequest>,
) -> Result<(StatusCode, Json<College>), AppError> {
    actor.require(&ADMINS)?;
    if req.name.trim().is_empty() || req.code.trim().is_empty() {
        return Err(AppError::BadRequest("name and code are required".to_string()));
    }
    if repository::find_college_by_code(&state.db, &req.code).await?.is_some() {
        return Err(AppError::Conflict(format!("college code {} already exists", req.code.trim())));
    }

    let college = repository::insert_college(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(college)))
}

pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(req): Json<UpdateCollegeRequest>,
) -> Result<Json<College>, AppError> {
    actor.require(&ADMINS)?;
    if let Some(code) = req.code.as_deref() {
        if let Some(other) = repository::find_college_by_code(&state.db, code).await? {
            if other.id != id {
                return Err(AppError::Conflict(format!(
                    "college code {} already exists",
                    code.trim()
                )));
            }
        }
    }

    let college = repository::update_college(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(college))
}

pub async fn remove(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    actor.require(&ADMINS)?;
    let ok = repository::delete_college(&state.db, &id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
