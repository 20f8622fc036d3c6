use sqlx::SqlitePool;

use super::now;
use crate::models::Setting;

pub async fn get_setting(db: &SqlitePool, key: &str) -> Result<Option<Setting>, sqlx::Error> {
    let row: Option<(String, String, String)> =
        sqlx::query_as("SELECT key, value, updated_at FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(db)
            .await?;

    match row {
        Some((key, value, updated_at)) => {
            let value = serde_json::from_str(&value).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
            Ok(Some(Setting { key, value, updated_at }))
        }
        None => Ok(None),
    }
}

pub async fn put_setting(
    db: &SqlitePool,
    key: &str,
    value: serde_json::Value,
) -> Result<Setting, sqlx::Error> {
    let now = now();
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value.to_string())
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Setting {
        key: key.to_string(),
        value,
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_overwrites_setting() {
        let pool = connect_in_memory().await.expect("Failed to create test db");
        assert!(get_setting(&pool, "academicYear").await.unwrap().is_none());

        put_setting(&pool, "academicYear", json!("2025-26")).await.unwrap();
        put_setting(&pool, "academicYear", json!({ "start": 2026 })).await.unwrap();

        let setting = get_setting(&pool, "academicYear").await.unwrap().unwrap();
        assert_eq!(setting.value, json!({ "start": 2026 }));
    }
}
