use sqlx::SqlitePool;
use sqlx::types::Json;
use uuid::Uuid;

use super::now;
use crate::models::{NewRoomRequest, Room, UpdateRoomRequest};

const ROOM_COLUMNS: &str =
    "id, number, capacity, building, floor, status, faculty, features, created_at, updated_at";

pub async fn fetch_rooms(
    db: &SqlitePool,
    building: Option<&str>,
    status: Option<&str>,
) -> Result<Vec<Room>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM rooms \
         WHERE (?1 IS NULL OR building = ?1) AND (?2 IS NULL OR status = ?2) \
         ORDER BY building, floor, number",
        ROOM_COLUMNS
    );
    sqlx::query_as::<_, Room>(&sql)
        .bind(building)
        .bind(status)
        .fetch_all(db)
        .await
}

pub async fn find_room_by_id(db: &SqlitePool, id: &str) -> Result<Option<Room>, sqlx::Error> {
    let sql = format!("SELECT {} FROM rooms WHERE id = ?", ROOM_COLUMNS);
    sqlx::query_as::<_, Room>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_room_by_number(
    db: &SqlitePool,
    number: &str,
) -> Result<Option<Room>, sqlx::Error> {
    let sql = format!("SELECT {} FROM rooms WHERE number = ?", ROOM_COLUMNS);
    sqlx::query_as::<_, Room>(&sql)
        .bind(number.trim())
        .fetch_optional(db)
        .await
}

pub async fn insert_room(db: &SqlitePool, req: NewRoomRequest) -> Result<Room, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = now();

    sqlx::query(
        r#"
        INSERT INTO rooms
            (id, number, capacity, building, floor, status, faculty, features,
            created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
        "#,
    )
    .bind(&id)
    .bind(req.number.trim())
    .bind(req.capacity)
    .bind(&req.building)
    .bind(req.floor)
    .bind(&req.status)
    .bind(&req.faculty)
    .bind(Json(&req.features))
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Room {
        id,
        number: req.number.trim().to_string(),
        capacity: req.capacity,
        building: req.building,
        floor: req.floor,
        status: req.status,
        faculty: req.faculty,
        features: req.features,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn update_room(
    db: &SqlitePool,
    id: &str,
    req: UpdateRoomRequest,
) -> Result<Option<Room>, sqlx::Error> {
    let mut current = match find_room_by_id(db, id).await? {
        Some(r) => r,
        None => return Ok(None),
    };

    if let Some(number) = req.number {
        current.number = number;
    }
    if let Some(capacity) = req.capacity {
        current.capacity = capacity;
    }
    if let Some(building) = req.building {
        current.building = building;
    }
    if let Some(floor) = req.floor {
        current.floor = floor;
    }
    if let Some(status) = req.status {
        current.status = status;
    }
    if req.faculty.is_some() {
        current.faculty = req.faculty;
    }
    if let Some(features) = req.features {
        current.features = features;
    }
    current.updated_at = now();

    sqlx::query(
        r#"
        UPDATE rooms
        SET number = ?1, capacity = ?2, building = ?3, floor = ?4, status = ?5,
            faculty = ?6, features = ?7, updated_at = ?8
        WHERE id = ?9
        "#,
    )
    .bind(&current.number)
    .bind(current.capacity)
    .bind(&current.building)
    .bind(current.floor)
    .bind(&current.status)
    .bind(&current.faculty)
    .bind(Json(&current.features))
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_room(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
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

    fn new_room(number: &str, building: &str, status: &str) -> NewRoomRequest {
        NewRoomRequest {
            number: number.to_string(),
            capacity: 60,
            building: building.to_string(),
            floor: 1,
            status: status.to_string(),
            faculty: None,
            features: vec!["projector".to_string()],
        }
    }

    #[tokio::test]
    async fn test_filter_rooms_by_building_and_status() {
        let pool = connect_in_memory().await.expect("Failed to create test db");
        insert_room(&pool, new_room("A101", "Block A", "available")).await.unwrap();
        insert_room(&pool, new_room("A102", "Block A", "maintenance")).await.unwrap();
        insert_room(&pool, new_room("B201", "Block B", "available")).await.unwrap();

        let block_a = fetch_rooms(&pool, Some("Block A"), None).await.unwrap();
        assert_eq!(block_a.len(), 2);

        let available_a = fetch_rooms(&pool, Some("Block A"), Some("available")).await.unwrap();
        assert_eq!(available_a.len(), 1);
        assert_eq!(available_a[0].number, "A101");
        assert_eq!(available_a[0].features, vec!["projector"]);
    }

    #[tokio::test]
    async fn test_duplicate_room_number_is_rejected() {
        let pool = connect_in_memory().await.expect("Failed to create test db");
        insert_room(&pool, new_room("A101", "Block A", "available")).await.unwrap();

        let err = insert_room(&pool, new_room("A101", "Block B", "available"))
            .await
            .expect_err("duplicate room number must fail");
        assert!(err.as_database_error().is_some_and(|e| e.is_unique_violation()));
    }
}
