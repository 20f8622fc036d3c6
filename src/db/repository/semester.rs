use sqlx::SqlitePool;
use uuid::Uuid;

use super::now;
use crate::models::Semester;

const SEMESTER_COLUMNS: &str = "id, name, number, status, created_at, updated_at";

pub async fn fetch_semesters(db: &SqlitePool) -> Result<Vec<Semester>, sqlx::Error> {
    let sql = format!("SELECT {} FROM semesters ORDER BY number", SEMESTER_COLUMNS);
    sqlx::query_as::<_, Semester>(&sql).fetch_all(db).await
}

pub async fn find_semester_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Semester>, sqlx::Error> {
    let sql = format!("SELECT {} FROM semesters WHERE id = ?", SEMESTER_COLUMNS);
    sqlx::query_as::<_, Semester>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_semester_by_number(
    db: &SqlitePool,
    number: i32,
) -> Result<Option<Semester>, sqlx::Error> {
    let sql = format!("SELECT {} FROM semesters WHERE number = ?", SEMESTER_COLUMNS);
    sqlx::query_as::<_, Semester>(&sql)
        .bind(number)
        .fetch_optional(db)
        .await
}

pub async fn find_active_semester(db: &SqlitePool) -> Result<Option<Semester>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM semesters WHERE status = 'active' ORDER BY number LIMIT 1",
        SEMESTER_COLUMNS
    );
    sqlx::query_as::<_, Semester>(&sql).fetch_optional(db).await
}

pub async fn insert_semester(db: &SqlitePool, number: i32) -> Result<Semester, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = now();
    let name = Semester::name_for(number);

    sqlx::query(
        r#"
        INSERT INTO semesters (id, name, number, status, created_at, updated_at)
        VALUES (?1, ?2, ?3, 'inactive', ?4, ?4)
        "#,
    )
    .bind(&id)
    .bind(&name)
    .bind(number)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Semester {
        id,
        name,
        number,
        status: "inactive".to_string(),
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Makes `id` the only active semester. Returns false (and changes nothing)
/// when the semester does not exist.
pub async fn activate_semester(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let now = now();
    let mut tx = db.begin().await?;

    let found = sqlx::query("UPDATE semesters SET status = 'active', updated_at = ?1 WHERE id = ?2")
        .bind(&now)
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if found == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query(
        "UPDATE semesters SET status = 'inactive', updated_at = ?1 \
         WHERE id != ?2 AND status != 'inactive'",
    )
    .bind(&now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(true)
}

pub async fn delete_semester(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM semesters WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    #[tokio::test]
    async fn test_only_one_semester_is_active() {
        let pool = connect_in_memory().await.expect("Failed to create test db");
        let first = insert_semester(&pool, 1).await.unwrap();
        let second = insert_semester(&pool, 2).await.unwrap();
        insert_semester(&pool, 3).await.unwrap();

        assert!(activate_semester(&pool, &first.id).await.unwrap());
        assert!(activate_semester(&pool, &second.id).await.unwrap());

        let active: Vec<Semester> = fetch_semesters(&pool)
            .await
            .unwrap()
            .into_iter()
            .filter(Semester::is_active)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second.id);

        let current = find_active_semester(&pool).await.unwrap().unwrap();
        assert_eq!(current.name, "Semester 2");
    }

    #[tokio::test]
    async fn test_activating_unknown_semester_changes_nothing() {
        let pool = connect_in_memory().await.expect("Failed to create test db");
        let first = insert_semester(&pool, 1).await.unwrap();
        assert!(activate_semester(&pool, &first.id).await.unwrap());

        assert!(!activate_semester(&pool, "missing").await.unwrap());
        let current = find_active_semester(&pool).await.unwrap().unwrap();
        assert_eq!(current.id, first.id);
    }
}
