use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{Course, Faculty};

pub const UNDERLOADED_BELOW: f64 = 60.0;
pub const OVERLOADED_ABOVE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Underloaded,
    Optimal,
    Overloaded,
}

impl LoadStatus {
    pub fn classify(percentage: f64) -> Self {
        if percentage < UNDERLOADED_BELOW {
            LoadStatus::Underloaded
        } else if percentage > OVERLOADED_ABOVE {
            LoadStatus::Overloaded
        } else {
            LoadStatus::Optimal
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseLoad {
    pub course_id: String,
    pub code: String,
    pub title: String,
    pub weekly_hours: String,
    pub hours: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub faculty_id: String,
    pub faculty_name: String,
    pub department: String,
    pub semester: String,
    pub assigned_hours: u32,
    pub max_hours: u32,
    pub percentage: f64,
    pub status: LoadStatus,
    pub courses: Vec<CourseLoad>,
}

/// Load of one faculty member for `semester` over the given course catalog.
///
/// A course counts when it runs in `semester` and the faculty member either
/// lists it in their assignments or appears on the course itself.
pub fn compute_load(
    faculty: &Faculty,
    courses: &[Course],
    semester: &str,
    default_max: u32,
) -> LoadReport {
    let listed = faculty.assigned_courses.for_semester(semester);

    let counted: Vec<CourseLoad> = courses
        .iter()
        .filter(|c| c.semester == semester)
        .filter(|c| listed.contains(&c.id) || c.is_taught_by(&faculty.id))
        .map(|c| CourseLoad {
            course_id: c.id.clone(),
            code: c.code.clone(),
            title: c.title.clone(),
            weekly_hours: c.hours().to_string(),
            hours: c.hours().total(),
        })
        .collect();

    let assigned_hours = counted.iter().fold(0u32, |sum, c| sum.saturating_add(c.hours));
    let max_hours = faculty
        .max_weekly_hours
        .and_then(|h| u32::try_from(h).ok())
        .unwrap_or(default_max);
    let percentage = load_percentage(assigned_hours, max_hours);

    LoadReport {
        faculty_id: faculty.id.clone(),
        faculty_name: faculty.name.clone(),
        department: faculty.department.clone(),
        semester: semester.to_string(),
        assigned_hours,
        max_hours,
        percentage,
        status: LoadStatus::classify(percentage),
        courses: counted,
    }
}

/// Percentage rounded to one decimal; a zero ceiling yields zero.
pub fn load_percentage(assigned: u32, max: u32) -> f64 {
    if max == 0 {
        return 0.0;
    }
    let raw = assigned as f64 / max as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

pub async fn faculty_load(
    db: &SqlitePool,
    faculty_id: &str,
    semester: &str,
    default_max: u32,
) -> Result<LoadReport, AppError> {
    let faculty = repository::find_faculty_by_id(db, faculty_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let courses = repository::fetch_courses(db, Some(semester)).await?;
    Ok(compute_load(&faculty, &courses, semester, default_max))
}

/// Reports for every active faculty member (of `department`, when given),
/// heaviest first.
pub async fn load_report(
    db: &SqlitePool,
    department: Option<&str>,
    semester: &str,
    default_max: u32,
) -> Result<Vec<LoadReport>, AppError> {
    let faculty = repository::fetch_faculty(db, department, Some(true)).await?;
    let courses = repository::fetch_courses(db, Some(semester)).await?;

    let mut reports: Vec<LoadReport> = faculty
        .iter()
        .map(|f| compute_load(f, &courses, semester, default_max))
        .collect();
    reports.sort_by(|a, b| {
        b.percentage
            .total_cmp(&a.percentage)
            .then_with(|| a.faculty_name.cmp(&b.faculty_name))
    });
    Ok(reports)
}
