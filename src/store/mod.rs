//! Persistence layer: employee records behind an async store trait.

pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use memory::InMemoryEmployeeStore;
pub use traits::EmployeeStore;
