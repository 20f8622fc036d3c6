use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const ROOM_STATUSES: [&str; 3] = ["available", "occupied", "maintenance"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub number: String,
    pub capacity: i32,
    pub building: String,
    pub floor: i32,
    pub status: String,
    pub faculty: Option<String>,
    #[sqlx(json)]
    pub features: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoomRequest {
    pub number: String,
    #[serde(default)]
    pub capacity: i32,
    #[serde(default)]
    pub building: String,
    #[serde(default)]
    pub floor: i32,
    #[serde(default = "default_status")]
    pub status: String,
    pub faculty: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    pub number: Option<String>,
    pub capacity: Option<i32>,
    pub building: Option<String>,
    pub floor: Option<i32>,
    pub status: Option<String>,
    pub faculty: Option<String>,
    pub features: Option<Vec<String>>,
}

fn default_status() -> String {
    "available".to_string()
}

pub fn validate_room_status(status: &str) -> Result<(), String> {
    if ROOM_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "status must be one of {}, got {:?}",
            ROOM_STATUSES.join(", "),
            status
        ))
    }
}

impl NewRoomRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.number.trim().is_empty() {
            return Err("number is required".to_string());
        }
        if self.capacity < 0 {
            return Err("capacity cannot be negative".to_string());
        }
        validate_room_status(&self.status)
    }
}
