use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{AssignFacultyRequest, Course, Department};

/// Replaces the faculty of a course and mirrors the change onto each
/// affected faculty member's assignments, in one transaction.
pub async fn assign_course_faculty(
    db: &SqlitePool,
    course_id: &str,
    req: AssignFacultyRequest,
) -> Result<Course, AppError> {
    let mut tx = db.begin().await?;

    let mut course = repository::find_course_by_id(&mut *tx, course_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut list: Vec<String> = Vec::new();
    for id in req.faculty.iter().chain(req.faculty_list.iter()) {
        let id = id.trim();
        if !id.is_empty() && !list.iter().any(|existing| existing == id) {
            list.push(id.to_string());
        }
    }

    let mut previous: Vec<String> = course.faculty.iter().cloned().collect();
    for id in &course.faculty_list {
        if !previous.contains(id) {
            previous.push(id.clone());
        }
    }

    for id in previous.iter().filter(|id| !list.contains(*id)) {
        // Former teachers that no longer exist are simply skipped.
        if let Some(mut faculty) = repository::find_faculty_by_id(&mut *tx, id).await? {
            if faculty.assigned_courses.unassign(&course.id) {
                repository::save_faculty_assignments(
                    &mut *tx,
                    &faculty.id,
                    &faculty.assigned_courses,
                )
                .await?;
            }
        }
    }

    for id in &list {
        let mut faculty = repository::find_faculty_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("faculty {} does not exist", id)))?;
        if faculty.assigned_courses.assign(&course.semester, &course.id) {
            repository::save_faculty_assignments(
                &mut *tx,
                &faculty.id,
                &faculty.assigned_courses,
            )
            .await?;
        }
    }

    course.faculty = req.faculty.map(|f| f.trim().to_string()).filter(|f| !f.is_empty());
    course.faculty_list = list;
    repository::save_course(&mut *tx, &mut course).await?;

    tx.commit().await?;
    info!(
        "course {} now taught by {:?} (list: {:?})",
        course.code, course.faculty, course.faculty_list
    );
    Ok(course)
}

/// Deletes a course and drops it from every faculty member that taught it.
pub async fn remove_course(db: &SqlitePool, course_id: &str) -> Result<(), AppError> {
    let mut tx = db.begin().await?;

    let course = repository::find_course_by_id(&mut *tx, course_id)
        .await?
        .ok_or(AppError::NotFound)?;

    for id in course.faculty.iter().chain(course.faculty_list.iter()) {
        if let Some(mut faculty) = repository::find_faculty_by_id(&mut *tx, id).await? {
            if faculty.assigned_courses.unassign(&course.id) {
                repository::save_faculty_assignments(
                    &mut *tx,
                    &faculty.id,
                    &faculty.assigned_courses,
                )
                .await?;
            }
        }
    }
    repository::delete_course(&mut *tx, &course.id).await?;

    tx.commit().await?;
    info!("deleted course {} ({})", course.code, course.semester);
    Ok(())
}

/// Makes `teacher_id` head of `department_id`, clearing the flag on the
/// previous head, in one transaction.
pub async fn assign_hod(
    db: &SqlitePool,
    department_id: &str,
    teacher_id: &str,
) -> Result<Department, AppError> {
    let mut tx = db.begin().await?;

    let department = repository::find_department_by_id(&mut *tx, department_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let teacher = repository::find_faculty_by_id(&mut *tx, teacher_id)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("faculty {} does not exist", teacher_id)))?;

    let same_department = teacher.department.eq_ignore_ascii_case(&department.name);
    if !teacher.department.is_empty() && !same_department {
        return Err(AppError::BadRequest(format!(
            "{} belongs to {}, not {}",
            teacher.name, teacher.department, department.name
        )));
    }

    if let Some(previous) = department.hod_id.as_deref().filter(|p| *p != teacher.id) {
        repository::set_faculty_hod(&mut *tx, previous, false).await?;
    }
    repository::set_faculty_hod(&mut *tx, &teacher.id, true).await?;
    repository::set_department_hod(
        &mut *tx,
        &department.id,
        Some(&teacher.id),
        Some(&teacher.name),
    )
    .await?;

    let updated = repository::find_department_by_id(&mut *tx, department_id)
        .await?
        .ok_or(AppError::NotFound)?;
    tx.commit().await?;

    info!("{} is now HOD of {}", teacher.name, updated.name);
    Ok(updated)
}
