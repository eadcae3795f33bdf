use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Employee model for reading from database
/// Derives Queryable for SELECT operations and Selectable for type-safe column selection
#[derive(Debug, Queryable, Selectable, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::employees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub salary: i32,
}

/// Employee data handed to the store's `save`.
///
/// A `None` id means the record was never persisted and the database assigns
/// one on insert (diesel writes `DEFAULT` for it). With `Some(id)` the row with
/// that id is overwritten.
#[derive(Debug, Insertable, Deserialize, Clone, PartialEq, Eq, Default)]
#[diesel(table_name = crate::schema::employees)]
pub struct NewEmployee {
    pub id: Option<i64>,
    pub name: String,
    pub department: String,
    pub salary: i32,
}

impl NewEmployee {
    pub fn new(name: impl Into<String>, department: impl Into<String>, salary: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            department: department.into(),
            salary,
        }
    }

    /// Pins the record to an existing row id.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Materializes the record under the given id.
    pub fn into_employee(self, id: i64) -> Employee {
        Employee {
            id,
            name: self.name,
            department: self.department,
            salary: self.salary,
        }
    }
}
