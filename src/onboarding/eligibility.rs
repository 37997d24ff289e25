//! Discovery of employees who should be onboarded now.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tracing::info;

use crate::error::RunError;
use crate::store::EmployeeStore;

use super::model::{Employee, Level};

/// Finds junior employees of one role who joined within a trailing window.
pub struct EligibilityQuery {
    store: Arc<dyn EmployeeStore>,
    role: String,
}

impl EligibilityQuery {
    pub fn new(store: Arc<dyn EmployeeStore>, role: impl Into<String>) -> Self {
        Self {
            store,
            role: role.into(),
        }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// Employees who joined on or after `today - window_days`.
    ///
    /// Order follows the store and is not significant. Windows reaching
    /// past the earliest representable date include everyone.
    pub async fn find(&self, window_days: u32, today: NaiveDate) -> Result<Vec<Employee>, RunError> {
        let cutoff = today
            .checked_sub_days(Days::new(u64::from(window_days)))
            .unwrap_or(NaiveDate::MIN);
        let employees = self
            .store
            .query_eligible(&self.role, Level::Junior, cutoff)
            .await?;
        info!(
            role = %self.role,
            %cutoff,
            count = employees.len(),
            "Eligible employees loaded"
        );
        Ok(employees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::error::DatabaseError;
    use crate::onboarding::model::fixtures::{date, employee};
    use crate::store::InMemoryEmployeeStore;

    fn query(employees: Vec<Employee>) -> EligibilityQuery {
        EligibilityQuery::new(Arc::new(InMemoryEmployeeStore::new(employees)), "Data Engineer")
    }

    #[tokio::test]
    async fn returns_only_recent_junior_target_role() {
        let today = date(2026, 10, 16);
        let q = query(vec![
            employee(1, "Data Engineer", Level::Junior, today, "Pune"),
            employee(2, "Data Engineer", Level::Junior, date(2026, 7, 8), "Pune"),
            employee(3, "Data Engineer", Level::Senior, today, "Pune"),
            employee(4, "Backend Engineer", Level::Junior, today, "Pune"),
        ]);
        let found = q.find(14, today).await.unwrap();
        assert_eq!(found.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1]);
    }

    #[tokio::test]
    async fn window_boundary_is_inclusive() {
        let today = date(2026, 10, 16);
        let q = query(vec![
            employee(1, "Data Engineer", Level::Junior, date(2026, 10, 2), "Pune"),
            employee(2, "Data Engineer", Level::Junior, date(2026, 10, 1), "Pune"),
        ]);
        let found = q.find(14, today).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[tokio::test]
    async fn zero_window_means_joined_today() {
        let today = date(2026, 10, 16);
        let q = query(vec![
            employee(1, "Data Engineer", Level::Junior, today, "Pune"),
            employee(2, "Data Engineer", Level::Junior, date(2026, 10, 15), "Pune"),
        ]);
        assert_eq!(q.find(0, today).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn huge_window_includes_everyone_without_overflow() {
        let today = date(2026, 10, 16);
        let q = query(vec![
            employee(1, "Data Engineer", Level::Junior, date(1970, 1, 1), "Pune"),
            employee(2, "Data Engineer", Level::Junior, today, "Pune"),
        ]);
        let found = q.find(u32::MAX, today).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    struct DownStore;

    #[async_trait]
    impl EmployeeStore for DownStore {
        async fn query_eligible(
            &self,
            _role: &str,
            _level: Level,
            _joined_on_or_after: NaiveDate,
        ) -> Result<Vec<Employee>, DatabaseError> {
            Err(DatabaseError::Pool("connection refused".into()))
        }

        async fn query_senior_by_location(
            &self,
            _role: &str,
            _location: &str,
        ) -> Result<Option<Employee>, DatabaseError> {
            Err(DatabaseError::Pool("connection refused".into()))
        }

        async fn query_senior_any(&self, _role: &str) -> Result<Option<Employee>, DatabaseError> {
            Err(DatabaseError::Pool("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn store_failure_is_fatal_run_error() {
        let q = EligibilityQuery::new(Arc::new(DownStore), "Data Engineer");
        let err = q.find(14, date(2026, 10, 16)).await.unwrap_err();
        assert!(matches!(err, RunError::Store(DatabaseError::Pool(_))));
    }
}
