use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const MAX_SEMESTER: i32 = 8;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Semester {
    pub id: String,
    pub name: String,
    pub number: i32,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Semester {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    pub fn name_for(number: i32) -> String {
        format!("Semester {}", number)
    }
}

/// Extracts N from `"Semester N"`, N in 1..=8.
pub fn parse_semester_name(name: &str) -> Option<i32> {
    let number: i32 = name.trim().strip_prefix("Semester ")?.trim().parse().ok()?;
    (1..=MAX_SEMESTER).contains(&number).then_some(number)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSemesterRequest {
    pub number: Option<i32>,
    pub name: Option<String>,
}

impl NewSemesterRequest {
    pub fn resolve_number(&self) -> Result<i32, String> {
        match (self.number, self.name.as_deref()) {
            (Some(n), _) if (1..=MAX_SEMESTER).contains(&n) => Ok(n),
            (Some(n), _) => Err(format!("semester number must be 1..={}, got {}", MAX_SEMESTER, n)),
            (None, Some(name)) => parse_semester_name(name)
                .ok_or_else(|| {
                    format!("semester name must look like \"Semester N\", got {:?}", name)
                }),
            (None, None) => Err("number or name is required".to_string()),
        }
    }
}
