use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::models::room::validate_room_status;
use crate::models::{
    Course, Faculty, NewCourseRequest, NewFacultyRequest, NewRoomRequest, Room, UpdateCourseRequest,
    UpdateFacultyRequest, UpdateRoomRequest, WeeklyHours,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseFilter {
    pub semester: Option<String>,
    /// Courses of this department plus every common course.
    pub department: Option<String>,
    #[serde(default)]
    pub common_only: bool,
}

pub async fn list_courses(db: &SqlitePool, filter: &CourseFilter) -> Result<Vec<Course>, AppError> {
    let courses = repository::fetch_courses(db, filter.semester.as_deref()).await?;

    Ok(courses
        .into_iter()
        .filter(|c| !filter.common_only || c.is_common())
        .filter(|c| match filter.department.as_deref() {
            Some(dept) => c.department.eq_ignore_ascii_case(dept.trim()) || c.is_common(),
            None => true,
        })
        .collect())
}

pub async fn create_course(db: &SqlitePool, req: NewCourseRequest) -> Result<Course, AppError> {
    req.validate().map_err(AppError::BadRequest)?;
    let hours = req
        .resolve_hours()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if repository::find_course_by_code(db, &req.code, &req.semester).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "course {} already exists in {}",
            req.code.trim(),
            req.semester.trim()
        )));
    }

    let course = repository::insert_course(db, req, hours).await?;
    info!("created course {} ({})", course.code, course.weekly_hours);
    Ok(course)
}

/// Applies a partial update. Moving a course to another semester re-files it
/// under that semester in its teachers' assignments, in the same transaction.
pub async fn update_course(
    db: &SqlitePool,
    id: &str,
    req: UpdateCourseRequest,
) -> Result<Course, AppError> {
    let mut course = repository::find_course_by_id(db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let previous_semester = course.semester.clone();

    let mut hours = match req.weekly_hours.as_deref() {
        Some(raw) => WeeklyHours::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => course.hours(),
    };
    if let Some(l) = req.lecture_hours {
        hours.lecture = l;
    }
    if let Some(t) = req.tutorial_hours {
        hours.tutorial = t;
    }
    if let Some(p) = req.practical_hours {
        hours.practical = p;
    }
    let hours = hours.check().map_err(|e| AppError::BadRequest(e.to_string()))?;
    (course.lecture_hours, course.tutorial_hours, course.practical_hours) = hours.as_columns();

    if let Some(code) = req.code {
        course.code = code.trim().to_string();
    }
    if let Some(title) = req.title {
        course.title = title.trim().to_string();
    }
    if let Some(semester) = req.semester {
        course.semester = semester.trim().to_string();
    }
    if let Some(department) = req.department {
        course.department = department.trim().to_string();
    }
    if let Some(flag) = req.is_common_course {
        course.is_common_course = flag;
    }
    if req.course_type.is_some() {
        course.course_type = req.course_type;
    }

    if course.code.is_empty() || course.title.is_empty() || course.semester.is_empty() {
        return Err(AppError::BadRequest("code, title and semester cannot be empty".to_string()));
    }
    let existing = repository::find_course_by_code(db, &course.code, &course.semester).await?;
    if let Some(other) = existing {
        if other.id != course.id {
            return Err(AppError::Conflict(format!(
                "course {} already exists in {}",
                course.code, course.semester
            )));
        }
    }

    let mut tx = db.begin().await?;
    if course.semester != previous_semester {
        for faculty_id in course.faculty.iter().chain(course.faculty_list.iter()) {
            let found = repository::find_faculty_by_id(&mut *tx, faculty_id).await?;
            let Some(mut faculty) = found else {
                continue;
            };
            if faculty.assigned_courses.unassign(&course.id) {
                faculty.assigned_courses.assign(&course.semester, &course.id);
                let assigned = &faculty.assigned_courses;
                repository::save_faculty_assignments(&mut *tx, &faculty.id, assigned).await?;
            }
        }
        info!(
            "course {} moved from {} to {}",
            course.code, previous_semester, course.semester
        );
    }
    repository::save_course(&mut *tx, &mut course).await?;
    tx.commit().await?;

    Ok(course)
}

pub async fn create_faculty(db: &SqlitePool, req: NewFacultyRequest) -> Result<Faculty, AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    if repository::find_faculty_by_email(db, &req.email).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "faculty with email {} already exists",
            req.email.trim()
        )));
    }
    if let Some(code) = req.code.as_deref().filter(|c| !c.trim().is_empty()) {
        if !repository::find_faculty_by_code(db, code).await?.is_empty() {
            return Err(AppError::Conflict(format!(
                "code {} is already in use",
                repository::normalize_code(code)
            )));
        }
    }

    let faculty = repository::insert_faculty(db, req).await?;
    info!("created faculty {} <{}>", faculty.name, faculty.email);
    Ok(faculty)
}

pub async fn update_faculty(
    db: &SqlitePool,
    id: &str,
    req: UpdateFacultyRequest,
) -> Result<Faculty, AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    if let Some(email) = req.email.as_deref() {
        if let Some(other) = repository::find_faculty_by_email(db, email).await? {
            if other.id != id {
                return Err(AppError::Conflict(format!(
                    "faculty with email {} already exists",
                    email.trim()
                )));
            }
        }
    }

    repository::update_faculty(db, id, req)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn create_room(db: &SqlitePool, req: NewRoomRequest) -> Result<Room, AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    if repository::find_room_by_number(db, &req.number).await?.is_some() {
        return Err(AppError::Conflict(format!("room {} already exists", req.number.trim())));
    }

    Ok(repository::insert_room(db, req).await?)
}

pub async fn update_room(
    db: &SqlitePool,
    id: &str,
    req: UpdateRoomRequest,
) -> Result<Room, AppError> {
    if let Some(status) = req.status.as_deref() {
        validate_room_status(status).map_err(AppError::BadRequest)?;
    }
    if req.capacity.is_some_and(|c| c < 0) {
        return Err(AppError::BadRequest("capacity cannot be negative".to_string()));
    }

    repository::update_room(db, id, req)
        .await?
        .ok_or(AppError::NotFound)
}
