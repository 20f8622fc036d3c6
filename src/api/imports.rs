use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::access::{Actor, Role};
use crate::error::AppError;
use crate::services::ImportKind;
use crate::services::import;
use crate::services::upload::{JobStatus, QueueStatus};
use crate::state::AppState;

const IMPORTERS: [Role; 2] = [Role::SuperAdmin, Role::TimetableIncharge];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportAccepted {
    pub job_id: Uuid,
    pub entity: String,
    pub records: usize,
    pub queue_length: usize,
}

/// Queues the document and answers before any record is written; progress
/// is read back from `/imports/{job_id}`.
pub async fn submit(
    State(state): State<AppState>,
    actor: Actor,
    Path(entity): Path<String>,
    Json(document): Json<Value>,
) -> Result<(StatusCode, Json<ImportAccepted>), AppError> {
    actor.require(&IMPORTERS)?;
    let kind: ImportKind = entity.parse()?;

    let handle = import::start_import(&state.uploads, &state.db, kind, document)?;
    let records = state.uploads.job(&handle.id).map(|j| j.total).unwrap_or_default();

    Ok((
        StatusCode::ACCEPTED,
        Json(ImportAccepted {
            job_id: handle.id,
            entity: kind.to_string(),
            records,
            queue_length: state.uploads.status().queue_length,
        }),
    ))
}

pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobStatus>, AppError> {
    let job = state.uploads.job(&job_id).ok_or(AppError::NotFound)?;
    Ok(Json(job))
}

pub async fn queue_status(State(state): State<AppState>) -> Json<QueueStatus> {
    Json(state.uploads.status())
}
