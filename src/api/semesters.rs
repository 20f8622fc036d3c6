use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::access::{Actor, Role};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{NewSemesterRequest, Semester};
use crate::state::AppState;

const ADMINS: [Role; 1] = [Role::SuperAdmin];

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Semester>>, AppError> {
    let semesters = repository::fetch_semesters(&state.db).await?;
    Ok(Json(semesters))
}

pub async fn active(State(state): State<AppState>) -> Result<Json<Semester>, AppError> {
    let semester = repository::find_active_semester(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(semester))
}

pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<NewSemesterRequest>,
) -> Result<(StatusCode, Json<Semester>), AppError> {
    actor.require(&ADMINS)?;
    let number = req.resolve_number().map_err(AppError::BadRequest)?;
    if repository::find_semester_by_number(&state.db, number).await?.is_some() {
        return Err(AppError::Conflict(format!("{} already exists", Semester::name_for(number))));
    }

    let semester = repository::insert_semester(&state.db, number).await?;
    Ok((StatusCode::CREATED, Json(semester)))
}

pub async fn activate(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<Semester>, AppError> {
    actor.require(&ADMINS)?;
    if !repository::activate_semester(&state.db, &id).await? {
        return Err(AppError::NotFound);
    }
    let semester = repository::find_semester_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(semester))
}

pub async fn remove(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    actor.require(&ADMINS)?;
    let ok = repository::delete_semester(&state.db, &id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
