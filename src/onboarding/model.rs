//! Employee records and run summaries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::steps::StepKind;

/// Seniority level of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Junior,
    Senior,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Junior => "junior",
            Self::Senior => "senior",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "junior" => Ok(Self::Junior),
            "senior" => Ok(Self::Senior),
            other => Err(format!("unknown level '{other}'")),
        }
    }
}

/// An employee as read from the store. The pipeline never writes these back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    /// Department or team name.
    pub department: String,
    pub joined_on: NaiveDate,
    pub location: String,
    pub level: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_email: Option<String>,
}

impl Employee {
    /// Whether this employee has `role` and `level` and joined on or after the cutoff.
    pub fn joined_as(&self, role: &str, level: Level, joined_on_or_after: NaiveDate) -> bool {
        self.role == role && self.level == level && self.joined_on >= joined_on_or_after
    }

    /// Whether this employee can mentor new joiners of `role`.
    pub fn can_mentor(&self, role: &str) -> bool {
        self.role == role && self.level == Level::Senior
    }
}

/// One employee whose chain did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDescriptor {
    pub employee_id: i64,
    pub email: String,
    pub step: StepKind,
    pub reason: String,
}

impl std::fmt::Display for FailureDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.email, self.reason, self.step)
    }
}

/// Aggregate outcome of one onboarding run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub processed: usize,
    pub successes: usize,
    pub failures: Vec<FailureDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RunSummary {
    /// Summary for a run that found nobody to onboard.
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Human-readable multi-line report.
    pub fn render(&self) -> String {
        let mut lines = vec![format!(
            "Processed {} employee(s): {} succeeded, {} failed",
            self.processed,
            self.successes,
            self.failures.len()
        )];
        if let Some(ref message) = self.message {
            lines.push(message.clone());
        }
        for failure in &self.failures {
            lines.push(format!("  - {failure}"));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn employee(id: i64, role: &str, level: Level, joined_on: NaiveDate, location: &str) -> Employee {
        Employee {
            id,
            name: format!("Employee {id}"),
            email: format!("employee{id}@example.com"),
            role: role.to_string(),
            department: "Data Platform".to_string(),
            joined_on,
            location: location.to_string(),
            level,
            manager_email: Some("lead.de@example.com".to_string()),
        }
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
}
