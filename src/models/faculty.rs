use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::AssignedCourses;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub designation: String,
    #[sqlx(json)]
    pub expertise: Vec<String>,
    pub qualification: String,
    pub experience: i32,
    pub active: bool,
    pub code: Option<String>,
    pub is_hod: bool,
    pub max_weekly_hours: Option<i32>,
    #[sqlx(json)]
    pub assigned_courses: AssignedCourses,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFacultyRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(default)]
    pub qualification: String,
    #[serde(default)]
    pub experience: i32,
    #[serde(default = "default_active")]
    pub active: bool,
    pub code: Option<String>,
    pub max_weekly_hours: Option<i32>,
    #[serde(default)]
    pub assigned_courses: AssignedCourses,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFacultyRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub expertise: Option<Vec<String>>,
    pub qualification: Option<String>,
    pub experience: Option<i32>,
    pub active: Option<bool>,
    pub max_weekly_hours: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCodeRequest {
    pub code: String,
}

fn default_active() -> bool {
    true
}

impl NewFacultyRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if self.email.trim().is_empty() {
            return Err("email is required".to_string());
        }
        if !self.email.contains('@') {
            return Err(format!("email is invalid: {}", self.email));
        }
        if self.experience < 0 {
            return Err("experience cannot be negative".to_string());
        }
        Ok(())
    }
}

impl UpdateFacultyRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err("name cannot be empty".to_string());
        }
        if let Some(email) = self.email.as_deref() {
            if email.trim().is_empty() {
                return Err("email cannot be empty".to_string());
            }
            if !email.contains('@') {
                return Err(format!("email is invalid: {}", email));
            }
        }
        if self.experience.is_some_and(|e| e < 0) {
            return Err("experience cannot be negative".to_string());
        }
        if self.max_weekly_hours.is_some_and(|h| h < 0) {
            return Err("maxWeeklyHours cannot be negative".to_string());
        }
        Ok(())
    }
}
