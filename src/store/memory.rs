//! In-memory `EmployeeStore`, used by tests and the offline demo.

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::error::DatabaseError;
use crate::onboarding::model::{Employee, Level};
use crate::store::traits::EmployeeStore;

#[derive(Default)]
pub struct InMemoryEmployeeStore {
    employees: RwLock<Vec<Employee>>,
}

impl InMemoryEmployeeStore {
    pub fn new(employees: Vec<Employee>) -> Self {
        Self {
            employees: RwLock::new(employees),
        }
    }

    async fn earliest_senior(&self, role: &str, location: Option<&str>) -> Option<Employee> {
        self.employees
            .read()
            .await
            .iter()
            .filter(|e| e.can_mentor(role))
            .filter(|e| location.is_none_or(|loc| e.location == loc))
            .min_by_key(|e| (e.joined_on, e.id))
            .cloned()
    }
}

#[async_trait]
impl EmployeeStore for InMemoryEmployeeStore {
    async fn query_eligible(
        &self,
        role: &str,
        level: Level,
        joined_on_or_after: NaiveDate,
    ) -> Result<Vec<Employee>, DatabaseError> {
        let mut found: Vec<Employee> = self
            .employees
            .read()
            .await
            .iter()
            .filter(|e| e.joined_as(role, level, joined_on_or_after))
            .cloned()
            .collect();
        found.sort_by_key(|e| e.id);
        Ok(found)
    }

    async fn query_senior_by_location(
        &self,
        role: &str,
        location: &str,
    ) -> Result<Option<Employee>, DatabaseError> {
        Ok(self.earliest_senior(role, Some(location)).await)
    }

    async fn query_senior_any(&self, role: &str) -> Result<Option<Employee>, DatabaseError> {
        Ok(self.earliest_senior(role, None).await)
    }
}
