//! Employee repository for async database operations.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Employee, NewEmployee};
use crate::repositories::EmployeeStore;

/// Employee repository holding an async connection pool.
///
/// Since `AsyncDbPool` (bb8::Pool) internally uses `Arc`, cloning is cheap.
#[derive(Clone)]
pub struct EmployeeRepository {
    pool: AsyncDbPool,
}

impl EmployeeRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeStore for EmployeeRepository {
    async fn find_all(&self) -> AppResult<Vec<Employee>> {
        use crate::schema::employees::dsl::*;
        let mut conn = self.pool.get().await?;

        employees
            .order(id.asc())
            .select(Employee::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Finds an employee by id.
    ///
    /// # Returns
    /// `Some(Employee)` if found, `None` otherwise
    async fn find_by_id(&self, employee_id: i64) -> AppResult<Option<Employee>> {
        use crate::schema::employees::dsl::*;
        let mut conn = self.pool.get().await?;

        employees
            .filter(id.eq(employee_id))
            .select(Employee::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Inserts or upserts in one statement.
    ///
    /// A `None` id is written as `DEFAULT`, so the sequence assigns it; a
    /// present id that already exists has its columns replaced.
    async fn save(&self, employee: NewEmployee) -> AppResult<Employee> {
        use crate::schema::employees::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(employees)
            .values(&employee)
            .on_conflict(id)
            .do_update()
            .set((
                name.eq(excluded(name)),
                department.eq(excluded(department)),
                salary.eq(excluded(salary)),
            ))
            .returning(Employee::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn delete_by_id(&self, employee_id: i64) -> AppResult<()> {
        use crate::schema::employees::dsl::*;
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(employees.filter(id.eq(employee_id)))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)?;

        tracing::debug!(employee_id, deleted, "Deleted employee rows");
        Ok(())
    }
}
