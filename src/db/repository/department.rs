use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use super::now;
use crate::models::{Department, NewDepartmentRequest, UpdateDepartmentRequest};

const DEPARTMENT_COLUMNS: &str =
    "id, name, category, college_id, hod_id, hod_name, active, created_at, updated_at";

pub async fn fetch_departments(
    db: &SqlitePool,
    college_id: Option<&str>,
) -> Result<Vec<Department>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM departments WHERE (?1 IS NULL OR college_id = ?1) ORDER BY name",
        DEPARTMENT_COLUMNS
    );
    sqlx::query_as::<_, Department>(&sql)
        .bind(college_id)
        .fetch_all(db)
        .await
}

pub async fn find_department_by_id<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: &str,
) -> Result<Option<Department>, sqlx::Error> {
    let sql = format!("SELECT {} FROM departments WHERE id = ?", DEPARTMENT_COLUMNS);
    sqlx::query_as::<_, Department>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_department(
    db: &SqlitePool,
    req: NewDepartmentRequest,
) -> Result<Department, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = now();

    sqlx::query(
        r#"
        INSERT INTO departments
            (id, name, category, college_id, hod_id, hod_name, active, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, NULL, NULL, ?5, ?6, ?6)
        "#,
    )
    .bind(&id)
    .bind(req.name.trim())
    .bind(&req.category)
    .bind(&req.college_id)
    .bind(req.active)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Department {
        id,
        name: req.name.trim().to_string(),
        category: req.category,
        college_id: req.college_id,
        hod_id: None,
        hod_name: None,
        active: req.active,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn update_department(
    db: &SqlitePool,
    id: &str,
    req: UpdateDepartmentRequest,
) -> Result<Option<Department>, sqlx::Error> {
    let mut current = match find_department_by_id(db, id).await? {
        Some(d) => d,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(category) = req.category {
        current.category = category;
    }
    if req.college_id.is_some() {
        current.college_id = req.college_id;
    }
    if let Some(active) = req.active {
        current.active = active;
    }
    current.updated_at = now();

    sqlx::query(
        r#"
        UPDATE departments
        SET name = ?1,
            category = ?2,
            college_id = ?3,
            active = ?4,
            updated_at = ?5
        WHERE id = ?6
        "#,
    )
    .bind(&current.name)
    .bind(&current.category)
    .bind(&current.college_id)
    .bind(current.active)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn set_department_hod<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: &str,
    hod_id: Option<&str>,
    hod_name: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE departments SET hod_id = ?1, hod_name = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(hod_id)
    .bind(hod_name)
    .bind(now())
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

/// Courses and faculty that reference the department are left in place.
pub async fn delete_department(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM departments WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
