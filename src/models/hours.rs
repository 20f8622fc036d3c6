use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HoursParseError {
    #[error("invalid weekly hours component: {0:?}")]
    InvalidComponent(String),

    #[error("weekly hours component {0} given more than once")]
    Repeated(char),

    #[error("{0} contact hours per week exceeds the limit of {MAX_WEEKLY_CONTACT_HOURS}")]
    TooMany(u32),
}

/// Hours in a week; no course can meet for longer.
pub const MAX_WEEKLY_CONTACT_HOURS: u32 = 168;

/// Lecture / tutorial / practical contact hours per week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyHours {
    pub lecture: u32,
    pub tutorial: u32,
    pub practical: u32,
}

impl WeeklyHours {
    pub fn new(lecture: u32, tutorial: u32, practical: u32) -> Self {
        Self { lecture, tutorial, practical }
    }

    pub fn total(&self) -> u32 {
        self.lecture
            .saturating_add(self.tutorial)
            .saturating_add(self.practical)
    }

    /// Rejects a week with more contact hours than the week has.
    pub fn check(self) -> Result<Self, HoursParseError> {
        let total = self.total();
        if total > MAX_WEEKLY_CONTACT_HOURS {
            return Err(HoursParseError::TooMany(total));
        }
        Ok(self)
    }

    /// Lecture, tutorial and practical as stored in integer columns.
    pub fn as_columns(&self) -> (i32, i32, i32) {
        let column = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
        (column(self.lecture), column(self.tutorial), column(self.practical))
    }

    /// Parses `"3L+1T+2P"` (any order, components optional) or the
    /// `"3-1-2"` L-T-P triple. An empty string or `"0"` is zero hours.
    /// More than [`MAX_WEEKLY_CONTACT_HOURS`] in total is an error.
    pub fn parse(input: &str) -> Result<Self, HoursParseError> {
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() || compact == "0" {
            return Ok(Self::default());
        }

        if compact.contains('-') {
            return Self::parse_triple(&compact)?.check();
        }

        let mut hours = Self::default();
        let mut seen = [false; 3];

        for part in compact.split('+') {
            let Some(unit) = part.chars().last() else {
                return Err(HoursParseError::InvalidComponent(part.to_string()));
            };
            let count: u32 = part[..part.len() - unit.len_utf8()]
                .parse()
                .map_err(|_| HoursParseError::InvalidComponent(part.to_string()))?;

            let unit = unit.to_ascii_uppercase();
            let slot = match unit {
                'L' => 0,
                'T' => 1,
                'P' => 2,
                _ => return Err(HoursParseError::InvalidComponent(part.to_string())),
            };
            if seen[slot] {
                return Err(HoursParseError::Repeated(unit));
            }
            seen[slot] = true;

            match slot {
                0 => hours.lecture = count,
                1 => hours.tutorial = count,
                _ => hours.practical = count,
            }
        }

        hours.check()
    }

    fn parse_triple(compact: &str) -> Result<Self, HoursParseError> {
        let parts: Vec<&str> = compact.split('-').collect();
        if parts.len() != 3 {
            return Err(HoursParseError::InvalidComponent(compact.to_string()));
        }
        let mut values = [0u32; 3];
        for (slot, part) in parts.iter().enumerate() {
            values[slot] = part
                .parse()
                .map_err(|_| HoursParseError::InvalidComponent(part.to_string()))?;
        }
        Ok(Self::new(values[0], values[1], values[2]))
    }
}

impl FromStr for WeeklyHours {
    type Err = HoursParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WeeklyHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [(self.lecture, 'L'), (self.tutorial, 'T'), (self.practical, 'P')]
            .iter()
            .filter(|(count, _)| *count > 0)
            .map(|(count, unit)| format!("{}{}", count, unit))
            .collect();

        if parts.is_empty() {
            write!(f, "0")
        } else {
            write!(f, "{}", parts.join("+"))
        }
    }
}
