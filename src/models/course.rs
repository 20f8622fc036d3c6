use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::hours::{HoursParseError, WeeklyHours};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub code: String,
    pub title: String,
    pub semester: String,
    pub department: String,
    pub faculty: Option<String>,
    #[sqlx(json)]
    pub faculty_list: Vec<String>,
    pub lecture_hours: i32,
    pub tutorial_hours: i32,
    pub practical_hours: i32,
    pub weekly_hours: String,
    pub is_common_course: bool,
    pub course_type: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Course {
    pub fn hours(&self) -> WeeklyHours {
        WeeklyHours::new(
            self.lecture_hours.max(0) as u32,
            self.tutorial_hours.max(0) as u32,
            self.practical_hours.max(0) as u32,
        )
    }

    pub fn is_common(&self) -> bool {
        is_common_course(self.is_common_course, &self.department, self.course_type.as_deref())
    }

    pub fn is_taught_by(&self, faculty_id: &str) -> bool {
        self.faculty.as_deref() == Some(faculty_id)
            || self.faculty_list.iter().any(|f| f == faculty_id)
    }
}

/// Resolves the current flag and the legacy "common" markers into one answer.
pub fn is_common_course(flag: bool, department: &str, course_type: Option<&str>) -> bool {
    if flag {
        return true;
    }
    let department = department.trim();
    if department.eq_ignore_ascii_case("common")
        || department.eq_ignore_ascii_case("all")
        || department.eq_ignore_ascii_case("all departments")
    {
        return true;
    }
    course_type.is_some_and(|t| t.trim().eq_ignore_ascii_case("common"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourseRequest {
    pub code: String,
    pub title: String,
    pub semester: String,
    #[serde(default)]
    pub department: String,
    pub faculty: Option<String>,
    #[serde(default)]
    pub faculty_list: Vec<String>,
    pub lecture_hours: Option<u32>,
    pub tutorial_hours: Option<u32>,
    pub practical_hours: Option<u32>,
    pub weekly_hours: Option<String>,
    #[serde(default)]
    pub is_common_course: bool,
    pub course_type: Option<String>,
}

impl NewCourseRequest {
    pub fn validate(&self) -> Result<(), String> {
        let required = [("code", &self.code), ("title", &self.title), ("semester", &self.semester)];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(format!("{} is required", field));
            }
        }
        Ok(())
    }

    /// Numeric hour fields win; the weekly hours string is the fallback.
    pub fn resolve_hours(&self) -> Result<WeeklyHours, HoursParseError> {
        let numeric = [self.lecture_hours, self.tutorial_hours, self.practical_hours];
        if numeric.iter().any(Option::is_some) {
            return WeeklyHours::new(
                self.lecture_hours.unwrap_or(0),
                self.tutorial_hours.unwrap_or(0),
                self.practical_hours.unwrap_or(0),
            )
            .check();
        }
        match &self.weekly_hours {
            Some(raw) => WeeklyHours::parse(raw),
            None => Ok(WeeklyHours::default()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub code: Option<String>,
    pub title: Option<String>,
    pub semester: Option<String>,
    pub department: Option<String>,
    pub lecture_hours: Option<u32>,
    pub tutorial_hours: Option<u32>,
    pub practical_hours: Option<u32>,
    pub weekly_hours: Option<String>,
    pub is_common_course: Option<bool>,
    pub course_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignFacultyRequest {
    pub faculty: Option<String>,
    #[serde(default)]
    pub faculty_list: Vec<String>,
}
