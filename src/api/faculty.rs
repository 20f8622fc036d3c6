use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use super::resolve_semester;
use crate::access::{Actor, Role};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{Faculty, NewFacultyRequest, SetCodeRequest, UpdateFacultyRequest};
use crate::services::allocation::{self, CodeConflict, CodeSuggestion};
use crate::services::catalog;
use crate::services::load::{self, LoadReport};
use crate::state::AppState;

const EDITORS: [Role; 2] = [Role::SuperAdmin, Role::Hod];
const CODE_EDITORS: [Role; 2] = [Role::SuperAdmin, Role::TimetableIncharge];

#[derive(Deserialize)]
pub struct FacultyQueryParams {
    department: Option<String>,
    active: Option<bool>,
}

#[derive(Deserialize)]
pub struct SemesterQuery {
    semester: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<FacultyQueryParams>,
) -> Result<Json<Vec<Faculty>>, AppError> {
    let faculty =
        repository::fetch_faculty(&state.db, params.department.as_deref(), params.active).await?;
    Ok(Json(faculty))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Faculty>, AppError> {
    let faculty = repository::find_faculty_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(faculty))
}

pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<NewFacultyRequest>,
) -> Result<(StatusCode, Json<Faculty>), AppError> {
    actor.require_department(&EDITORS, &req.department)?;
    let faculty = catalog::create_faculty(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(faculty)))
}

pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(req): Json<UpdateFacultyRequest>,
) -> Result<Json<Faculty>, AppError> {
    let current = repository::find_faculty_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    actor.require_department(&EDITORS, &current.department)?;
    if let Some(department) = req.department.as_deref() {
        actor.require_department(&EDITORS, department)?;
    }

    let faculty = catalog::update_faculty(&state.db, &id, req).await?;
    Ok(Json(faculty))
}

pub async fn remove(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let current = repository::find_faculty_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    actor.require_department(&EDITORS, &current.department)?;

    let ok = repository::delete_faculty(&state.db, &id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

pub async fn set_code(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(req): Json<SetCodeRequest>,
) -> Result<Json<Faculty>, AppError> {
    actor.require(&CODE_EDITORS)?;
    let faculty = allocation::set_code(&state.db, &id, &req.code).await?;
    Ok(Json(faculty))
}

pub async fn load(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SemesterQuery>,
) -> Result<Json<LoadReport>, AppError> {
    let semester = resolve_semester(&state, params.semester).await?;
    let max_hours = state.config.max_weekly_hours;
    let report = load::faculty_load(&state.db, &id, &semester, max_hours).await?;
    Ok(Json(report))
}

pub async fn code_conflicts(
    State(state): State<AppState>,
) -> Result<Json<Vec<CodeConflict>>, AppError> {
    let faculty = repository::fetch_faculty(&state.db, None, None).await?;
    Ok(Json(allocation::find_conflicts(&faculty)))
}

pub async fn missing_codes(
    State(state): State<AppState>,
) -> Result<Json<Vec<CodeSuggestion>>, AppError> {
    let faculty = repository::fetch_faculty(&state.db, None, None).await?;
    Ok(Json(allocation::missing_codes(&faculty)))
}
