//! In-process employee store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::AppResult;
use crate::models::{Employee, NewEmployee};
use crate::repositories::EmployeeStore;

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, Employee>,
    last_id: i64,
}

/// Employee store backed by an ordered map, with ids assigned like a
/// `BIGSERIAL` column.
#[derive(Debug, Default)]
pub struct MemoryEmployeeStore {
    table: Mutex<Table>,
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn find_all(&self) -> AppResult<Vec<Employee>> {
        Ok(self.table.lock().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Employee>> {
        Ok(self.table.lock().await.rows.get(&id).cloned())
    }

    async fn save(&self, employee: NewEmployee) -> AppResult<Employee> {
        let mut table = self.table.lock().await;

        let id = match employee.id {
            Some(id) => {
                table.last_id = table.last_id.max(id);
                id
            }
            None => {
                table.last_id += 1;
                table.last_id
            }
        };

        let saved = employee.into_employee(id);
        table.rows.insert(id, saved.clone());
        Ok(saved)
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        self.table.lock().await.rows.remove(&id);
        Ok(())
    }
}
