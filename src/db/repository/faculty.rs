use sqlx::types::Json;
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use super::now;
use crate::models::{AssignedCourses, Faculty, NewFacultyRequest, UpdateFacultyRequest};

const FACULTY_COLUMNS: &str = "id, name, email, department, designation, expertise, qualification, \
    experience, active, code, is_hod, max_weekly_hours, assigned_courses, created_at, updated_at";

pub async fn fetch_faculty(
    db: &SqlitePool,
    department: Option<&str>,
    active: Option<bool>,
) -> Result<Vec<Faculty>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM teachers \
         WHERE (?1 IS NULL OR department = ?1) AND (?2 IS NULL OR active = ?2) \
         ORDER BY name",
        FACULTY_COLUMNS
    );
    sqlx::query_as::<_, Faculty>(&sql)
        .bind(department)
        .bind(active)
        .fetch_all(db)
        .await
}

pub async fn find_faculty_by_id<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: &str,
) -> Result<Option<Faculty>, sqlx::Error> {
    let sql = format!("SELECT {} FROM teachers WHERE id = ?", FACULTY_COLUMNS);
    sqlx::query_as::<_, Faculty>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_faculty_by_email(
    db: &SqlitePool,
    email: &str,
) -> Result<Option<Faculty>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM teachers WHERE lower(email) = lower(?) LIMIT 1",
        FACULTY_COLUMNS
    );
    sqlx::query_as::<_, Faculty>(&sql)
        .bind(email.trim())
        .fetch_optional(db)
        .await
}

pub async fn insert_faculty(
    db: &SqlitePool,
    req: NewFacultyRequest,
) -> Result<Faculty, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = now();
    let code = req.code.as_deref().map(normalize_code).filter(|c| !c.is_empty());

    sqlx::query(
        r#"
        INSERT INTO teachers
            (id, name, email, department, designation, expertise, qualification,
            experience, active, code, is_hod, max_weekly_hours, assigned_courses,
            created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0, ?11, ?12, ?13, ?13)
        "#,
    )
    .bind(&id)
    .bind(req.name.trim())
    .bind(req.email.trim())
    .bind(req.department.trim())
    .bind(&req.designation)
    .bind(Json(&req.expertise))
    .bind(&req.qualification)
    .bind(req.experience)
    .bind(req.active)
    .bind(&code)
    .bind(req.max_weekly_hours)
    .bind(Json(&req.assigned_courses))
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Faculty {
        id,
        name: req.name.trim().to_string(),
        email: req.email.trim().to_string(),
        department: req.department.trim().to_string(),
        designation: req.designation,
        expertise: req.expertise,
        qualification: req.qualification,
        experience: req.experience,
        active: req.active,
        code,
        is_hod: false,
        max_weekly_hours: req.max_weekly_hours,
        assigned_courses: req.assigned_courses,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn update_faculty(
    db: &SqlitePool,
    id: &str,
    req: UpdateFacultyRequest,
) -> Result<Option<Faculty>, sqlx::Error> {
    let mut current = match find_faculty_by_id(db, id).await? {
        Some(f) => f,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name.trim().to_string();
    }
    if let Some(email) = req.email {
        current.email = email.trim().to_string();
    }
    if let Some(department) = req.department {
        current.department = department;
    }
    if let Some(designation) = req.designation {
        current.designation = designation;
    }
    if let Some(expertise) = req.expertise {
        current.expertise = expertise;
    }
    if let Some(qualification) = req.qualification {
        current.qualification = qualification;
    }
    if let Some(experience) = req.experience {
        current.experience = experience;
    }
    if let Some(active) = req.active {
        current.active = active;
    }
    if req.max_weekly_hours.is_some() {
        current.max_weekly_hours = req.max_weekly_hours;
    }
    current.updated_at = now();

    sqlx::query(
        r#"
        UPDATE teachers
        SET name = ?1,
            email = ?2,
            department = ?3,
            designation = ?4,
            expertise = ?5,
            qualification = ?6,
            experience = ?7,
            active = ?8,
            max_weekly_hours = ?9,
            updated_at = ?10
        WHERE id = ?11
        "#,
    )
    .bind(&current.name)
    .bind(&current.email)
    .bind(&current.department)
    .bind(&current.designation)
    .bind(Json(&current.expertise))
    .bind(&current.qualification)
    .bind(current.experience)
    .bind(current.active)
    .bind(current.max_weekly_hours)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_faculty(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM teachers WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn save_faculty_assignments<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: &str,
    assigned: &AssignedCourses,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE teachers SET assigned_courses = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(Json(assigned))
            .bind(now())
            .bind(id)
            .execute(db)
            .await?
            .rows_affected();

    Ok(result > 0)
}

pub async fn set_faculty_hod<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: &str,
    is_hod: bool,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE teachers SET is_hod = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(is_hod)
        .bind(now())
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn set_faculty_code(
    db: &SqlitePool,
    id: &str,
    code: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let code = code.map(normalize_code).filter(|c| !c.is_empty());
    let result = sqlx::query("UPDATE teachers SET code = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(code)
        .bind(now())
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn find_faculty_by_code(
    db: &SqlitePool,
    code: &str,
) -> Result<Vec<Faculty>, sqlx::Error> {
    let sql = format!("SELECT {} FROM teachers WHERE code = ? ORDER BY name", FACULTY_COLUMNS);
    sqlx::query_as::<_, Faculty>(&sql)
        .bind(normalize_code(code))
        .fetch_all(db)
        .await
}

/// Teacher codes compare trimmed and uppercased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
