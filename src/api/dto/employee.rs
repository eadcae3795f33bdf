//! Employee DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Employee, NewEmployee};

/// Request body for creating or replacing an employee.
///
/// `id` is accepted so that clients echoing a fetched record do not fail to
/// parse; it is rejected on create and ignored on update.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct EmployeeRequest {
    pub id: Option<i64>,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    #[schema(example = "Taro Yamada", min_length = 1, max_length = 255)]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Department must be between 1 and 255 characters"
    ))]
    #[schema(example = "Engineering", min_length = 1, max_length = 255)]
    pub department: String,
    #[validate(range(min = 0, message = "Salary must not be negative"))]
    #[schema(example = 1000, minimum = 0)]
    pub salary: i32,
}

impl EmployeeRequest {
    pub fn into_new_employee(self) -> NewEmployee {
        NewEmployee {
            id: self.id,
            name: self.name,
            department: self.department,
            salary: self.salary,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct EmployeeResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Taro Yamada")]
    pub name: String,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = 1000)]
    pub salary: i32,
}

impl From<Employee> for EmployeeResponse {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.name,
            department: employee.department,
            salary: employee.salary,
        }
    }
}
