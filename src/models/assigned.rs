use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Course ids assigned to a faculty member.
///
/// Older records stored a flat list of course ids; newer ones key the ids by
/// semester name. Both shapes deserialize into this type. Ids from the flat
/// list have no semester and live in `unscoped` until they are re-assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "AssignedCoursesRepr")]
pub struct AssignedCourses {
    pub by_semester: BTreeMap<String, Vec<String>>,
    pub unscoped: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AssignedCoursesRepr {
    Normalized(NormalizedRepr),
    Legacy(Vec<String>),
    BySemester(BTreeMap<String, Vec<String>>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct NormalizedRepr {
    #[serde(default)]
    by_semester: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    unscoped: Vec<String>,
}

impl From<AssignedCoursesRepr> for AssignedCourses {
    fn from(repr: AssignedCoursesRepr) -> Self {
        match repr {
            AssignedCoursesRepr::Normalized(n) => Self {
                by_semester: n.by_semester,
                unscoped: n.unscoped,
            },
            AssignedCoursesRepr::Legacy(ids) => Self {
                by_semester: BTreeMap::new(),
                unscoped: ids,
            },
            AssignedCoursesRepr::BySemester(by_semester) => Self {
                by_semester,
                unscoped: Vec::new(),
            },
        }
    }
}

impl AssignedCourses {
    pub fn is_empty(&self) -> bool {
        self.unscoped.is_empty() && self.by_semester.values().all(|ids| ids.is_empty())
    }

    /// Every assigned id once, in first-seen order.
    pub fn all_course_ids(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for id in self.by_semester.values().flatten().chain(self.unscoped.iter()) {
            if !out.contains(id) {
                out.push(id.clone());
            }
        }
        out
    }

    /// Ids under `semester` plus all unscoped ids.
    pub fn for_semester(&self, semester: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let scoped = self.by_semester.get(semester).into_iter().flatten();
        for id in scoped.chain(self.unscoped.iter()) {
            if !out.contains(id) {
                out.push(id.clone());
            }
        }
        out
    }

    pub fn contains(&self, course_id: &str) -> bool {
        self.unscoped.iter().any(|id| id == course_id)
            || self.by_semester.values().flatten().any(|id| id == course_id)
    }

    /// Returns false when the id was already assigned under `semester`.
    pub fn assign(&mut self, semester: &str, course_id: &str) -> bool {
        self.unscoped.retain(|id| id != course_id);
        let ids = self.by_semester.entry(semester.to_string()).or_default();
        if ids.iter().any(|id| id == course_id) {
            return false;
        }
        ids.push(course_id.to_string());
        true
    }

    /// Returns true when the id was present anywhere.
    pub fn unassign(&mut self, course_id: &str) -> bool {
        let before = self.unscoped.len() + self.by_semester.values().map(Vec::len).sum::<usize>();
        self.unscoped.retain(|id| id != course_id);
        for ids in self.by_semester.values_mut() {
            ids.retain(|id| id != course_id);
        }
        self.by_semester.retain(|_, ids| !ids.is_empty());
        let after = self.unscoped.len() + self.by_semester.values().map(Vec::len).sum::<usize>();
        before != after
    }
}
