//! Mentor selection with location preference and fallback.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::StepError;
use crate::store::EmployeeStore;

use super::model::Employee;

/// Picks the earliest-joined senior of a role, preferring a location.
pub struct MentorSelector {
    store: Arc<dyn EmployeeStore>,
    role: String,
}

impl MentorSelector {
    pub fn new(store: Arc<dyn EmployeeStore>, role: impl Into<String>) -> Self {
        Self {
            store,
            role: role.into(),
        }
    }

    /// Same-location senior if one exists, else any senior, else
    /// `SelectionExhausted`.
    pub async fn select(&self, preferred_location: &str) -> Result<Employee, StepError> {
        if let Some(mentor) = self
            .store
            .query_senior_by_location(&self.role, preferred_location)
            .await?
        {
            debug!(mentor = %mentor.email, location = preferred_location, "Mentor found locally");
            return Ok(mentor);
        }

        match self.store.query_senior_any(&self.role).await? {
            Some(mentor) => {
                info!(
                    mentor = %mentor.email,
                    preferred = preferred_location,
                    actual = %mentor.location,
                    "No local mentor, falling back"
                );
                Ok(mentor)
            }
            None => Err(StepError::SelectionExhausted {
                role: self.role.clone(),
            }),
        }
    }
}
