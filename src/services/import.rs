use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::AppError;
use crate::models::{NewCourseRequest, NewFacultyRequest, NewRoomRequest};
use crate::services::catalog;
use crate::services::upload::{RecordHandler, UploadHandle, UploadQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Faculty,
    Courses,
    Rooms,
}

impl ImportKind {
    /// Object keys under which an exported file may hold its records.
    fn keys(&self) -> &'static [&'static str] {
        match self {
            ImportKind::Faculty => &["teachers", "faculty"],
            ImportKind::Courses => &["courses"],
            ImportKind::Rooms => &["rooms"],
        }
    }
}

impl FromStr for ImportKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "faculty" | "teachers" => Ok(ImportKind::Faculty),
            "courses" => Ok(ImportKind::Courses),
            "rooms" => Ok(ImportKind::Rooms),
            other => Err(AppError::BadRequest(format!("unknown import type: {}", other))),
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportKind::Faculty => "faculty",
            ImportKind::Courses => "courses",
            ImportKind::Rooms => "rooms",
        };
        write!(f, "{}", name)
    }
}

/// Pulls the record array out of an uploaded file: either the top-level
/// array or the array under one of the kind's keys.
pub fn extract_records(kind: ImportKind, document: Value) -> Result<Vec<Value>, AppError> {
    match document {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            for key in kind.keys() {
                if let Some(Value::Array(items)) = map.remove(*key) {
                    return Ok(items);
                }
            }
            Err(AppError::BadRequest(format!(
                "expected an array or an object with a {} array",
                kind.keys().join("/")
            )))
        }
        _ => Err(AppError::BadRequest(
            "import file must be a JSON array or object".to_string(),
        )),
    }
}

fn parse_record<T: serde::de::DeserializeOwned>(
    kind: ImportKind,
    record: &Value,
) -> Result<T, AppError> {
    serde_json::from_value(record.clone())
        .map_err(|e| AppError::BadRequest(format!("invalid {} record: {}", kind, e)))
}

pub struct FacultyImporter {
    db: SqlitePool,
}

#[async_trait]
impl RecordHandler for FacultyImporter {
    async fn handle(&self, record: &Value) -> Result<String, AppError> {
        let req: NewFacultyRequest = parse_record(ImportKind::Faculty, record)?;
        Ok(catalog::create_faculty(&self.db, req).await?.id)
    }
}

pub struct CourseImporter {
    db: SqlitePool,
}

#[async_trait]
impl RecordHandler for CourseImporter {
    async fn handle(&self, record: &Value) -> Result<String, AppError> {
        let req: NewCourseRequest = parse_record(ImportKind::Courses, record)?;
        Ok(catalog::create_course(&self.db, req).await?.id)
    }
}

pub struct RoomImporter {
    db: SqlitePool,
}

#[async_trait]
impl RecordHandler for RoomImporter {
    async fn handle(&self, record: &Value) -> Result<String, AppError> {
        let req: NewRoomRequest = parse_record(ImportKind::Rooms, record)?;
        Ok(catalog::create_room(&self.db, req).await?.id)
    }
}

pub fn importer_for(kind: ImportKind, db: SqlitePool) -> Arc<dyn RecordHandler> {
    match kind {
        ImportKind::Faculty => Arc::new(FacultyImporter { db }),
        ImportKind::Courses => Arc::new(CourseImporter { db }),
        ImportKind::Rooms => Arc::new(RoomImporter { db }),
    }
}

/// Queues an uploaded file for import and returns immediately.
pub fn start_import(
    queue: &UploadQueue,
    db: &SqlitePool,
    kind: ImportKind,
    document: Value,
) -> Result<UploadHandle, AppError> {
    let records = extract_records(kind, document)?;
    let count = records.len();
    let handle = queue.submit(kind.to_string(), records, importer_for(kind, db.clone()))?;
    info!("queued {} import job {} with {} records", kind, handle.id, count);
    Ok(handle)
}
