use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct College {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    pub college_type: String,
    pub status: String,
    pub dean: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollegeRequest {
    pub name: String,
    pub code: String,
    #[serde(rename = "type", default)]
    pub college_type: String,
    #[serde(default = "default_status")]
    pub status: String,
    pub dean: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCollegeRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub college_type: Option<String>,
    pub status: Option<String>,
    pub dean: Option<String>,
}

fn default_status() -> String {
    "active".to_string()
}
