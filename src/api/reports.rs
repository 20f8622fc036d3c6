use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use super::resolve_semester;
use crate::error::AppError;
use crate::services::load::{self, LoadReport};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoadQueryParams {
    semester: Option<String>,
    department: Option<String>,
}

/// Load of every active faculty member, heaviest first.
pub async fn load(
    State(state): State<AppState>,
    Query(params): Query<LoadQueryParams>,
) -> Result<Json<Vec<LoadReport>>, AppError> {
    let semester = resolve_semester(&state, params.semester).await?;
    let reports = load::load_report(
        &state.db,
        params.department.as_deref(),
        &semester,
        state.config.max_weekly_hours,
    )
    .await?;
    Ok(Json(reports))
}
