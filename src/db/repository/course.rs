use sqlx::types::Json;
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use super::now;
use crate::models::course::is_common_course;
use crate::models::{Course, NewCourseRequest, WeeklyHours};

const COURSE_COLUMNS: &str = "id, code, title, semester, department, faculty, faculty_list, \
    lecture_hours, tutorial_hours, practical_hours, weekly_hours, is_common_course, course_type, \
    created_at, updated_at";

pub async fn fetch_courses(
    db: &SqlitePool,
    semester: Option<&str>,
) -> Result<Vec<Course>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM courses WHERE (?1 IS NULL OR semester = ?1) ORDER BY semester, code",
        COURSE_COLUMNS
    );
    sqlx::query_as::<_, Course>(&sql)
        .bind(semester)
        .fetch_all(db)
        .await
}

pub async fn find_course_by_id<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    let sql = format!("SELECT {} FROM courses WHERE id = ?", COURSE_COLUMNS);
    sqlx::query_as::<_, Course>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_course_by_code(
    db: &SqlitePool,
    code: &str,
    semester: &str,
) -> Result<Option<Course>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM courses WHERE lower(code) = lower(?1) AND semester = ?2 LIMIT 1",
        COURSE_COLUMNS
    );
    sqlx::query_as::<_, Course>(&sql)
        .bind(code.trim())
        .bind(semester.trim())
        .fetch_optional(db)
        .await
}

/// Inserts with `hours` already resolved by the caller. The common flag is
/// written as true when any legacy marker says so.
pub async fn insert_course(
    db: &SqlitePool,
    req: NewCourseRequest,
    hours: WeeklyHours,
) -> Result<Course, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = now();
    let is_common =
        is_common_course(req.is_common_course, &req.department, req.course_type.as_deref());
    let weekly_hours = hours.to_string();
    let (lecture_hours, tutorial_hours, practical_hours) = hours.as_columns();

    sqlx::query(
        r#"
        INSERT INTO courses
            (id, code, title, semester, department, faculty, faculty_list,
            lecture_hours, tutorial_hours, practical_hours, weekly_hours,
            is_common_course, course_type, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)
        "#,
    )
    .bind(&id)
    .bind(req.code.trim())
    .bind(req.title.trim())
    .bind(req.semester.trim())
    .bind(req.department.trim())
    .bind(&req.faculty)
    .bind(Json(&req.faculty_list))
    .bind(lecture_hours)
    .bind(tutorial_hours)
    .bind(practical_hours)
    .bind(&weekly_hours)
    .bind(is_common)
    .bind(&req.course_type)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Course {
        id,
        code: req.code.trim().to_string(),
        title: req.title.trim().to_string(),
        semester: req.semester.trim().to_string(),
        department: req.department.trim().to_string(),
        faculty: req.faculty,
        faculty_list: req.faculty_list,
        lecture_hours,
        tutorial_hours,
        practical_hours,
        weekly_hours,
        is_common_course: is_common,
        course_type: req.course_type,
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Writes every mutable column of `course`, re-deriving the display string
/// and the common flag.
pub async fn save_course<'e, E: SqliteExecutor<'e>>(
    db: E,
    course: &mut Course,
) -> Result<bool, sqlx::Error> {
    course.weekly_hours = course.hours().to_string();
    course.is_common_course = course.is_common();
    course.updated_at = now();

    let result = sqlx::query(
        r#"
        UPDATE courses
        SET code = ?1,
            title = ?2,
            semester = ?3,
            department = ?4,
            faculty = ?5,
            faculty_list = ?6,
            lecture_hours = ?7,
            tutorial_hours = ?8,
            practical_hours = ?9,
            weekly_hours = ?10,
            is_common_course = ?11,
            course_type = ?12,
            updated_at = ?13
        WHERE id = ?14
        "#,
    )
    .bind(&course.code)
    .bind(&course.title)
    .bind(&course.semester)
    .bind(&course.department)
    .bind(&course.faculty)
    .bind(Json(&course.faculty_list))
    .bind(course.lecture_hours)
    .bind(course.tutorial_hours)
    .bind(course.practical_hours)
    .bind(&course.weekly_hours)
    .bind(course.is_common_course)
    .bind(&course.course_type)
    .bind(&course.updated_at)
    .bind(&course.id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn delete_course<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
