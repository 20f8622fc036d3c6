use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository::{self, normalize_code};
use crate::error::AppError;
use crate::models::Faculty;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeHolder {
    pub id: String,
    pub name: String,
    pub department: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeConflict {
    pub code: String,
    pub faculty: Vec<CodeHolder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSuggestion {
    pub id: String,
    pub name: String,
    pub suggested_code: String,
}

/// Codes held by more than one faculty member, sorted by code.
pub fn find_conflicts(faculty: &[Faculty]) -> Vec<CodeConflict> {
    let mut by_code: BTreeMap<String, Vec<CodeHolder>> = BTreeMap::new();

    for f in faculty {
        let Some(code) = f.code.as_deref().map(normalize_code).filter(|c| !c.is_empty()) else {
            continue;
        };
        by_code.entry(code).or_default().push(CodeHolder {
            id: f.id.clone(),
            name: f.name.clone(),
            department: f.department.clone(),
        });
    }

    by_code
        .into_iter()
        .filter(|(_, holders)| holders.len() > 1)
        .map(|(code, mut holders)| {
            holders.sort_by(|a, b| a.name.cmp(&b.name));
            CodeConflict { code, faculty: holders }
        })
        .collect()
}

/// Initials of `name`, with a numeric suffix when the initials are taken.
pub fn suggest_code(name: &str, taken: &HashSet<String>) -> String {
    let words: Vec<&str> = name
        .split_whitespace()
        .filter(|w| !is_honorific(w))
        .collect();

    let mut base: String = if words.len() >= 2 {
        words.iter().filter_map(|w| w.chars().next()).collect()
    } else {
        words.first().map(|w| w.chars().take(2).collect()).unwrap_or_default()
    };
    base = base.to_uppercase();
    if base.is_empty() {
        base = "TC".to_string();
    }

    if !taken.contains(&base) {
        return base;
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{}{}", base, suffix);
        if !taken.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn is_honorific(word: &str) -> bool {
    let word = word.trim_end_matches('.').to_lowercase();
    matches!(word.as_str(), "dr" | "prof" | "mr" | "mrs" | "ms")
}

/// Suggestions for everyone without a code, never reusing an existing code
/// or an earlier suggestion.
pub fn missing_codes(faculty: &[Faculty]) -> Vec<CodeSuggestion> {
    let mut taken: HashSet<String> = faculty
        .iter()
        .filter_map(|f| f.code.as_deref().map(normalize_code))
        .filter(|c| !c.is_empty())
        .collect();

    let mut suggestions = Vec::new();
    for f in faculty {
        let has_code = f.code.as_deref().is_some_and(|c| !c.trim().is_empty());
        if has_code {
            continue;
        }
        let code = suggest_code(&f.name, &taken);
        taken.insert(code.clone());
        suggestions.push(CodeSuggestion {
            id: f.id.clone(),
            name: f.name.clone(),
            suggested_code: code,
        });
    }
    suggestions
}

/// Assigns `code` to a faculty member, refusing codes held by anyone else.
/// An empty code clears the assignment.
pub async fn set_code(db: &SqlitePool, faculty_id: &str, code: &str) -> Result<Faculty, AppError> {
    let code = normalize_code(code);

    if !code.is_empty() {
        let holders = repository::find_faculty_by_code(db, &code).await?;
        if let Some(other) = holders.iter().find(|f| f.id != faculty_id) {
            return Err(AppError::Conflict(format!(
                "code {} is already used by {}",
                code, other.name
            )));
        }
    }

    let updated = repository::set_faculty_code(db, faculty_id, Some(&code)).await?;
    if !updated {
        return Err(AppError::NotFound);
    }
    info!("teacher code for {} set to {:?}", faculty_id, code);

    repository::find_faculty_by_id(db, faculty_id)
        .await?
        .ok_or(AppError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssignedCourses;

    fn faculty(id: &str, name: &str, code: Option<&str>) -> Faculty {
        Faculty {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@uni.edu", id),
            department: "CSE".to_string(),
            designation: String::new(),
            expertise: Vec::new(),
            qualification: String::new(),
            experience: 0,
            active: true,
            code: code.map(str::to_string),
            is_hod: false,
            max_weekly_hours: None,
            assigned_courses: AssignedCourses::default(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn detects_case_insensitive_duplicates() {
        let all = vec![
            faculty("1", "Rohan Kapoor", Some("RK")),
            faculty("2", "Anita Rao", Some("AR")),
            faculty("3", "Ravi Kumar", Some(" rk")),
            faculty("4", "No Code", None),
        ];

        let conflicts = find_conflicts(&all);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].code, "RK");
        let names: Vec<&str> = conflicts[0].faculty.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Ravi Kumar", "Rohan Kapoor"]);
    }

    #[test]
    fn suggestions_skip_honorifics_and_taken_codes() {
        let mut taken = HashSet::new();
        assert_eq!(suggest_code("Dr. Meera Nair", &taken), "MN");
        assert_eq!(suggest_code("Sundar", &taken), "SU");

        taken.insert("MN".to_string());
        taken.insert("MN2".to_string());
        assert_eq!(suggest_code("Mohan Naidu", &taken), "MN3");
    }

    #[test]
    fn missing_codes_do_not_collide_with_each_other() {
        let all = vec![
            faculty("1", "Meera Nair", Some("MN")),
            faculty("2", "Mohan Naidu", None),
            faculty("3", "Manoj Nath", Some("")),
        ];

        let suggestions = missing_codes(&all);
        let codes: Vec<&str> = suggestions.iter().map(|s| s.suggested_code.as_str()).collect();
        assert_eq!(codes, vec!["MN2", "MN3"]);
    }
}
