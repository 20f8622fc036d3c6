use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use super::resolve_semester;
use crate::access::{Actor, Role};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{AssignHodRequest, Department, NewDepartmentRequest, UpdateDepartmentRequest};
use crate::services::assignment;
use crate::services::load::{self, LoadReport};
use crate::state::AppState;

const ADMINS: [Role; 1] = [Role::SuperAdmin];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentQueryParams {
    college_id: Option<String>,
}

#[derive(Deserialize)]
pub struct SemesterQuery {
    semester: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<DepartmentQueryParams>,
) -> Result<Json<Vec<Department>>, AppError> {
    let departments = repository::fetch_departments(&state.db, params.college_id.as_deref()).await?;
    Ok(Json(departments))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Department>, AppError> {
    let department = repository::find_department_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(department))
}

pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<NewDepartmentRequest>,
) -> Result<(StatusCode, Json<Department>), AppError> {
    actor.require(&ADMINS)?;
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    let department = repository::insert_department(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(req): Json<UpdateDepartmentRequest>,
) -> Result<Json<Department>, AppError> {
    actor.require(&ADMINS)?;
    let department = repository::update_department(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(department))
}

pub async fn remove(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    actor.require(&ADMINS)?;
    let ok = repository::delete_department(&state.db, &id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

pub async fn assign_hod(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(req): Json<AssignHodRequest>,
) -> Result<Json<Department>, AppError> {
    actor.require(&ADMINS)?;
    let department = assignment::assign_hod(&state.db, &id, &req.teacher_id).await?;
    Ok(Json(department))
}

pub async fn load(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SemesterQuery>,
) -> Result<Json<Vec<LoadReport>>, AppError> {
    let department = repository::find_department_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let semester = resolve_semester(&state, params.semester).await?;
    let reports = load::load_report(
        &state.db,
        Some(&department.name),
        &semester,
        state.config.max_weekly_hours,
    )
    .await?;
    Ok(Json(reports))
}
