use sqlx::SqlitePool;
use uuid::Uuid;

use super::now;
use crate::models::{College, NewCollegeRequest, UpdateCollegeRequest};

const COLLEGE_COLUMNS: &str = "id, name, code, college_type, status, dean, created_at, updated_at";

pub async fn fetch_colleges(db: &SqlitePool) -> Result<Vec<College>, sqlx::Error> {
    let sql = format!("SELECT {} FROM colleges ORDER BY name", COLLEGE_COLUMNS);
    sqlx::query_as::<_, College>(&sql).fetch_all(db).await
}

pub async fn find_college_by_id(db: &SqlitePool, id: &str) -> Result<Option<College>, sqlx::Error> {
    let sql = format!("SELECT {} FROM colleges WHERE id = ?", COLLEGE_COLUMNS);
    sqlx::query_as::<_, College>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_college_by_code(
    db: &SqlitePool,
    code: &str,
) -> Result<Option<College>, sqlx::Error> {
    let sql = format!("SELECT {} FROM colleges WHERE upper(code) = upper(?)", COLLEGE_COLUMNS);
    sqlx::query_as::<_, College>(&sql)
        .bind(code.trim())
        .fetch_optional(db)
        .await
}

pub async fn insert_college(
    db: &SqlitePool,
    req: NewCollegeRequest,
) -> Result<College, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = now();

    sqlx::query(
        r#"
        INSERT INTO colleges
            (id, name, code, college_type, status, dean, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        "#,
    )
    .bind(&id)
    .bind(req.name.trim())
    .bind(req.code.trim())
    .bind(&req.college_type)
    .bind(&req.status)
    .bind(&req.dean)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(College {
        id,
        name: req.name.trim().to_string(),
        code: req.code.trim().to_string(),
        college_type: req.college_type,
        status: req.status,
        dean: req.dean,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn update_college(
    db: &SqlitePool,
    id: &str,
    req: UpdateCollegeRequest,
) -> Result<Option<College>, sqlx::Error> {
    let mut current = match find_college_by_id(db, id).await? {
        Some(c) => c,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(code) = req.code {
        current.code = code;
    }
    if let Some(college_type) = req.college_type {
        current.college_type = college_type;
    }
    if let Some(status) = req.status {
        current.status = status;
    }
    if req.dean.is_some() {
        current.dean = req.dean;
    }
    current.updated_at = now();

    sqlx::query(
        r#"
        UPDATE colleges
        SET name = ?1, code = ?2, college_type = ?3, status = ?4, dean = ?5, updated_at = ?6
        WHERE id = ?7
        "#,
    )
    .bind(&current.name)
    .bind(&current.code)
    .bind(&current.college_type)
    .bind(&current.status)
    .bind(&current.dean)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_college(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM colleges WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
