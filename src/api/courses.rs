use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use crate::access::{Actor, Role};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{AssignFacultyRequest, Course, NewCourseRequest, UpdateCourseRequest};
use crate::services::catalog::{self, CourseFilter};
use crate::services::assignment;
use crate::state::AppState;

const EDITORS: [Role; 2] = [Role::SuperAdmin, Role::Hod];
const SCHEDULERS: [Role; 3] = [Role::SuperAdmin, Role::TimetableIncharge, Role::Hod];

async fn existing(state: &AppState, id: &str) -> Result<Course, AppError> {
    repository::find_course_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<CourseFilter>,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = catalog::list_courses(&state.db, &filter).await?;
    Ok(Json(courses))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    Ok(Json(existing(&state, &id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<NewCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    actor.require_department(&EDITORS, &req.department)?;
    let course = catalog::create_course(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    let current = existing(&state, &id).await?;
    actor.require_department(&EDITORS, &current.department)?;
    if let Some(department) = req.department.as_deref() {
        actor.require_department(&EDITORS, department)?;
    }

    let course = catalog::update_course(&state.db, &id, req).await?;
    Ok(Json(course))
}

pub async fn remove(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let current = existing(&state, &id).await?;
    actor.require_department(&EDITORS, &current.department)?;

    assignment::remove_course(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_faculty(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(req): Json<AssignFacultyRequest>,
) -> Result<Json<Course>, AppError> {
    let current = existing(&state, &id).await?;
    actor.require_department(&SCHEDULERS, &current.department)?;

    let course = assignment::assign_course_faculty(&state.db, &id, req).await?;
    Ok(Json(course))
}
