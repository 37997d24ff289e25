//! Read-only employee store contract.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::DatabaseError;
use crate::onboarding::model::{Employee, Level};

/// Backend-agnostic employee lookups used by the onboarding pipeline.
///
/// "Earliest-joined" lookups break ties on the smallest `id`, so repeated
/// calls over the same data always return the same employee.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Employees with the given role and level who joined on or after the date.
    async fn query_eligible(
        &self,
        role: &str,
        level: Level,
        joined_on_or_after: NaiveDate,
    ) -> Result<Vec<Employee>, DatabaseError>;

    /// Earliest-joined senior employee of `role` at `location`.
    async fn query_senior_by_location(
        &self,
        role: &str,
        location: &str,
    ) -> Result<Option<Employee>, DatabaseError>;

    /// Earliest-joined senior employee of `role` anywhere.
    async fn query_senior_any(&self, role: &str) -> Result<Option<Employee>, DatabaseError>;
}
