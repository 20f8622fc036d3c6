mod colleges;
mod courses;
mod departments;
mod faculty;
mod imports;
mod reports;
mod rooms;
mod semesters;
mod settings;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, put};
use axum::{Router, extract::State, http::StatusCode};
use tower_http::trace::TraceLayer;

use crate::db::repository;
use crate::error::AppError;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/faculty", get(faculty::list).post(faculty::create))
        .route("/faculty/codes/conflicts", get(faculty::code_conflicts))
        .route("/faculty/codes/missing", get(faculty::missing_codes))
        .route(
            "/faculty/{id}",
            get(faculty::get_one).patch(faculty::update).delete(faculty::remove),
        )
        .route("/faculty/{id}/code", put(faculty::set_code))
        .route("/faculty/{id}/load", get(faculty::load))
        .route("/courses", get(courses::list).post(courses::create))
        .route(
            "/courses/{id}",
            get(courses::get_one).patch(courses::update).delete(courses::remove),
        )
        .route("/courses/{id}/faculty", put(courses::assign_faculty))
        .route("/departments", get(departments::list).post(departments::create))
        .route(
            "/departments/{id}",
            get(departments::get_one)
                .patch(departments::update)
                .delete(departments::remove),
        )
        .route("/departments/{id}/hod", put(departments::assign_hod))
        .route("/departments/{id}/load", get(departments::load))
        .route("/colleges", get(colleges::list).post(colleges::create))
        .route(
            "/colleges/{id}",
            get(colleges::get_one).patch(colleges::update).delete(colleges::remove),
        )
        .route("/rooms", get(rooms::list).post(rooms::create))
        .route(
            "/rooms/{id}",
            get(rooms::get_one).patch(rooms::update).delete(rooms::remove),
        )
        .route("/semesters", get(semesters::list).post(semesters::create))
        .route("/semesters/active", get(semesters::active))
        .route("/semesters/{id}", delete(semesters::remove))
        .route("/semesters/{id}/activate", put(semesters::activate))
        .route("/settings/{key}", get(settings::get_one).put(settings::put_one))
        .route("/imports/status", get(imports::queue_status))
        .route("/imports/{entity}", get(imports::job_status).post(imports::submit))
        .route("/reports/load", get(reports::load))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

/// The requested semester, or the active one when none is given.
async fn resolve_semester(state: &AppState, requested: Option<String>) -> Result<String, AppError> {
    match requested.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
        Some(semester) => Ok(semester),
        None => repository::find_active_semester(&state.db)
            .await?
            .map(|s| s.name)
            .ok_or_else(|| {
                AppError::BadRequest("semester is required when none is active".to_string())
            }),
    }
}
