//! Repository layer for data access operations.
//!
//! `EmployeeStore` is the persistence contract the service layer is written
//! against. `EmployeeRepository` implements it on PostgreSQL; `MemoryEmployeeStore`
//! keeps rows in process for tests and database-less runs.

mod employee_repo;
mod memory;

pub use employee_repo::EmployeeRepository;
pub use memory::MemoryEmployeeStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::AsyncDbPool;
use crate::error::AppResult;
use crate::models::{Employee, NewEmployee};

/// Persistence contract for employee rows.
///
/// `save` is atomic per row, and `find_by_id` / `delete_by_id` observe every
/// completed `save`.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Every stored employee, ordered by id.
    async fn find_all(&self) -> AppResult<Vec<Employee>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Employee>>;

    /// Insert when `employee.id` is `None` (the store assigns the id),
    /// otherwise insert-or-replace the row with that id.
    async fn save(&self, employee: NewEmployee) -> AppResult<Employee>;

    /// Remove the row if present; a missing id is not an error.
    async fn delete_by_id(&self, id: i64) -> AppResult<()>;
}

/// Aggregates all repositories for convenient access.
#[derive(Clone)]
pub struct Repositories {
    pub employees: Arc<dyn EmployeeStore>,
}

impl Repositories {
    /// Creates repositories backed by the database pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            employees: Arc::new(EmployeeRepository::new(pool)),
        }
    }

    /// Creates repositories over an arbitrary employee store.
    pub fn with_store(employees: Arc<dyn EmployeeStore>) -> Self {
        Self { employees }
    }

    /// Creates repositories backed by process memory.
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryEmployeeStore::new()))
    }
}
