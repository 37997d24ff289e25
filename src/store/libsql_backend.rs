//! libSQL implementation of `EmployeeStore`.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;

use crate::error::DatabaseError;
use crate::onboarding::model::{Employee, Level};
use crate::store::migrations;
use crate::store::traits::EmployeeStore;

/// Column order shared by every employee query. See `row_to_employee`.
const EMPLOYEE_COLUMNS: &str =
    "id, name, email, role, department, date_joined, location, level, manager_email";

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        migrations::run_migrations(&backend.conn).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        migrations::run_migrations(&backend.conn).await?;
        Ok(backend)
    }

    /// Insert an employee. The `id` field is ignored; the store assigns one.
    pub async fn insert_employee(&self, employee: &Employee) -> Result<i64, DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO employees (name, email, role, department, date_joined, location, level, manager_email)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    employee.name.as_str(),
                    employee.email.as_str(),
                    employee.role.as_str(),
                    employee.department.as_str(),
                    employee.joined_on.to_string(),
                    employee.location.as_str(),
                    employee.level.as_str(),
                    opt_text(employee.manager_email.as_deref()),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_employee: {e}")))?;
        Ok(self.conn.last_insert_rowid())
    }

    pub async fn count_employees(&self) -> Result<i64, DatabaseError> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(1) FROM employees", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("count_employees: {e}")))?;
        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("count_employees: {e}")))?;
        match row {
            Some(row) => row
                .get::<i64>(0)
                .map_err(|e| DatabaseError::Serialization(e.to_string())),
            None => Ok(0),
        }
    }

    /// Populate an empty table with the demo roster. Returns rows inserted.
    pub async fn seed_demo_employees(&self, today: NaiveDate) -> Result<usize, DatabaseError> {
        if self.count_employees().await? > 0 {
            return Ok(0);
        }
        let roster = demo_roster(today);
        for employee in &roster {
            self.insert_employee(employee).await?;
        }
        info!(count = roster.len(), "Seeded demo employees");
        Ok(roster.len())
    }

    async fn query_employees(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<Employee>, DatabaseError> {
        let mut rows = self
            .conn
            .query(sql, params)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut employees = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?
        {
            match row_to_employee(&row) {
                Ok(employee) => employees.push(employee),
                Err(e) => tracing::warn!("Skipping employee row: {e}"),
            }
        }
        Ok(employees)
    }

    /// Fetch at most one row. A row that fails to map is an error rather
    /// than an absent result.
    async fn query_one(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Option<Employee>, DatabaseError> {
        let mut rows = self
            .conn
            .query(sql, params)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        row.as_ref().map(row_to_employee).transpose()
    }
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

/// Map a libsql Row to an Employee. Column order matches EMPLOYEE_COLUMNS.
fn row_to_employee(row: &libsql::Row) -> Result<Employee, DatabaseError> {
    let get_text = |idx: i32| {
        row.get::<String>(idx)
            .map_err(|e| DatabaseError::Serialization(format!("column {idx}: {e}")))
    };

    let joined = get_text(5)?;
    let joined_on = NaiveDate::parse_from_str(joined.trim(), "%Y-%m-%d")
        .map_err(|e| DatabaseError::Serialization(format!("date_joined '{joined}': {e}")))?;
    let level: Level = get_text(7)?
        .parse()
        .map_err(DatabaseError::Serialization)?;

    Ok(Employee {
        id: row
            .get::<i64>(0)
            .map_err(|e| DatabaseError::Serialization(format!("column 0: {e}")))?,
        name: get_text(1)?,
        email: get_text(2)?,
        role: get_text(3)?,
        department: get_text(4)?,
        joined_on,
        location: get_text(6)?,
        level,
        manager_email: row.get::<String>(8).ok().filter(|s| !s.is_empty()),
    })
}

/// Demo roster: two junior Data Engineers (one new, one not), two senior
/// mentors in different cities, and a junior in another role.
fn demo_roster(today: NaiveDate) -> Vec<Employee> {
    let person = |name: &str,
                  email: &str,
                  role: &str,
                  department: &str,
                  joined_on: NaiveDate,
                  location: &str,
                  level: Level,
                  manager: &str| Employee {
        id: 0,
        name: name.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        department: department.to_string(),
        joined_on,
        location: location.to_string(),
        level,
        manager_email: Some(manager.to_string()),
    };

    vec![
        person(
            "Kaushal Vachhani",
            "kaushal.vachhani@example.com",
            "Data Engineer",
            "Data Platform",
            today,
            "Bengaluru",
            Level::Junior,
            "lead.de@example.com",
        ),
        person(
            "Asha Patel",
            "asha.patel@example.com",
            "Data Engineer",
            "Data Platform",
            today - Duration::days(100),
            "Bengaluru",
            Level::Junior,
            "lead.de@example.com",
        ),
        person(
            "Neeraj Singh",
            "neeraj.singh@example.com",
            "Data Engineer",
            "Data Platform",
            today - Duration::days(400),
            "Bengaluru",
            Level::Senior,
            "director.de@example.com",
        ),
        person(
            "Sneha Rao",
            "sneha.rao@example.com",
            "Data Engineer",
            "Data Platform",
            today - Duration::days(900),
            "Pune",
            Level::Senior,
            "director.de@example.com",
        ),
        person(
            "Karan Shah",
            "karan.shah@example.com",
            "Backend Engineer",
            "App Eng",
            today - Duration::days(7),
            "Bengaluru",
            Level::Junior,
            "lead.be@example.com",
        ),
    ]
}

#[async_trait]
impl EmployeeStore for LibSqlBackend {
    async fn query_eligible(
        &self,
        role: &str,
        level: Level,
        joined_on_or_after: NaiveDate,
    ) -> Result<Vec<Employee>, DatabaseError> {
        self.query_employees(
            &format!(
                "SELECT {EMPLOYEE_COLUMNS} FROM employees
                 WHERE role = ?1 AND level = ?2 AND date(date_joined) >= date(?3)"
            ),
            params![role, level.as_str(), joined_on_or_after.to_string()],
        )
        .await
    }

    async fn query_senior_by_location(
        &self,
        role: &str,
        location: &str,
    ) -> Result<Option<Employee>, DatabaseError> {
        self.query_one(
            &format!(
                "SELECT {EMPLOYEE_COLUMNS} FROM employees
                 WHERE role = ?1 AND level = 'senior' AND location = ?2
                   AND date(date_joined) IS NOT NULL
                 ORDER BY date(date_joined) ASC, id ASC
                 LIMIT 1"
            ),
            params![role, location],
        )
        .await
    }

    async fn query_senior_any(&self, role: &str) -> Result<Option<Employee>, DatabaseError> {
        self.query_one(
            &format!(
                "SELECT {EMPLOYEE_COLUMNS} FROM employees
                 WHERE role = ?1 AND level = 'senior'
                   AND date(date_joined) IS NOT NULL
                 ORDER BY date(date_joined) ASC, id ASC
                 LIMIT 1"
            ),
            params![role],
        )
        .await
    }
}
