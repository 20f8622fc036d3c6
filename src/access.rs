use std::fmt;
use std::str::FromStr;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::Serialize;

use crate::error::AppError;

pub const ROLE_HEADER: &str = "x-user-role";
pub const DEPARTMENT_HEADER: &str = "x-user-department";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Hod,
    TimetableIncharge,
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "super_admin" | "superadmin" => Ok(Role::SuperAdmin),
            "hod" => Ok(Role::Hod),
            "timetable_incharge" | "timetableincharge" => Ok(Role::TimetableIncharge),
            other => Err(AppError::Unauthorized(format!("unknown role: {}", other))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::SuperAdmin => "super_admin",
            Role::Hod => "hod",
            Role::TimetableIncharge => "timetable_incharge",
        };
        write!(f, "{}", name)
    }
}

/// Caller identity taken from request headers. Reads need none; writes
/// check it through [`Actor::require`].
#[derive(Debug, Clone, Default)]
pub struct Actor {
    pub role: Option<Role>,
    pub department: Option<String>,
}

impl Actor {
    pub fn new(role: Role, department: Option<&str>) -> Self {
        Self {
            role: Some(role),
            department: department.map(str::to_string),
        }
    }

    pub fn require(&self, allowed: &[Role]) -> Result<Role, AppError> {
        let role = self
            .role
            .ok_or_else(|| AppError::Unauthorized(format!("{} header is required", ROLE_HEADER)))?;
        if allowed.contains(&role) {
            Ok(role)
        } else {
            Err(AppError::Forbidden(format!("{} may not perform this action", role)))
        }
    }

    /// Like [`Actor::require`], but an HOD may only act on their own
    /// department.
    pub fn require_department(&self, allowed: &[Role], department: &str) -> Result<Role, AppError> {
        let role = self.require(allowed)?;
        if role == Role::Hod {
            let own = self.department.as_deref().map(str::trim).unwrap_or_default();
            if own.is_empty() || !own.eq_ignore_ascii_case(department.trim()) {
                return Err(AppError::Forbidden(format!(
                    "HOD of {:?} may not modify {:?}",
                    own, department
                )));
            }
        }
        Ok(role)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| -> Result<Option<String>, AppError> {
            match parts.headers.get(name) {
                Some(value) => value
                    .to_str()
                    .map(|v| Some(v.to_string()))
                    .map_err(|_| {
                        AppError::BadRequest(format!("{} header is not valid text", name))
                    }),
                None => Ok(None),
            }
        };

        let role = header(ROLE_HEADER)?
            .filter(|r| !r.trim().is_empty())
            .map(|r| r.parse::<Role>())
            .transpose()?;
        let department = header(DEPARTMENT_HEADER)?.filter(|d| !d.trim().is_empty());

        Ok(Actor { role, department })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_role_spellings() {
        assert_eq!("SuperAdmin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("timetable-incharge".parse::<Role>().unwrap(), Role::TimetableIncharge);
        assert!(matches!("dean".parse::<Role>(), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn anonymous_writes_are_unauthorized() {
        let actor = Actor::default();
        assert!(matches!(actor.require(&[Role::SuperAdmin]), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn hod_is_limited_to_own_department() {
        let hod = Actor::new(Role::Hod, Some("CSE"));
        let allowed = [Role::SuperAdmin, Role::Hod];
        assert!(hod.require_department(&allowed, "cse").is_ok());
        assert!(matches!(hod.require_department(&allowed, "ECE"), Err(AppError::Forbidden(_))));
        assert!(matches!(hod.require(&[Role::SuperAdmin]), Err(AppError::Forbidden(_))));

        let admin = Actor::new(Role::SuperAdmin, None);
        assert!(admin.require_department(&allowed, "ECE").is_ok());
    }
}
