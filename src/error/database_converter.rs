use crate::error::AppError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Utility for converting database errors to structured AppError variants.
///
/// Constraint violations that point at a single column become `Validation`
/// errors; everything else stays a `Database` error carrying the operation
/// name so callers can log it.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    ///
    /// # Arguments
    /// * `error` - The Diesel error to convert
    /// * `operation` - Description of the database operation that failed
    ///
    /// # Returns
    /// An AppError variant appropriate for the type of database error
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info, operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: Box<dyn diesel::result::DatabaseErrorInformation + Send + Sync>,
        operation: &str,
    ) -> AppError {
        let message = info.message();

        match (kind, info.column_name()) {
            (DatabaseErrorKind::NotNullViolation, Some(column)) => AppError::Validation {
                field: column.to_string(),
                reason: "Field is required".to_string(),
            },
            (DatabaseErrorKind::CheckViolation, Some(column)) => AppError::Validation {
                field: column.to_string(),
                reason: format!("Check constraint failed: {}", message),
            },
            (DatabaseErrorKind::UniqueViolation, _) => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("Unique constraint violation: {}", message)),
            },
            _ => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("Database error: {}", message)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    struct MockDatabaseErrorInfo {
        message: String,
        column_name: Option<String>,
    }

    impl diesel::result::DatabaseErrorInformation for MockDatabaseErrorInfo {
        fn message(&self) -> &str {
            &self.message
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            Some("employees")
        }

        fn column_name(&self) -> Option<&str> {
            self.column_name.as_deref()
        }

        fn constraint_name(&self) -> Option<&str> {
            None
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    #[test]
    fn test_convert_not_found_error() {
        let result = DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "find");

        match result {
            AppError::NotFound { entity, field, .. } => {
                assert_eq!(entity, "resource");
                assert_eq!(field, "id");
            }
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_convert_not_null_violation() {
        let info = MockDatabaseErrorInfo {
            message: "null value in column \"name\" violates not-null constraint".to_string(),
            column_name: Some("name".to_string()),
        };
        let error = DieselError::DatabaseError(DatabaseErrorKind::NotNullViolation, Box::new(info));

        match DatabaseErrorConverter::convert_diesel_error(error, "save employee") {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "name");
                assert!(reason.contains("required"));
            }
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_unique_violation_stays_database_error() {
        let info = MockDatabaseErrorInfo {
            message: "duplicate key value violates unique constraint \"employees_pkey\"".to_string(),
            column_name: None,
        };
        let error = DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, Box::new(info));

        match DatabaseErrorConverter::convert_diesel_error(error, "save employee") {
            AppError::Database { operation, source } => {
                assert_eq!(operation, "save employee");
                assert!(source.to_string().contains("employees_pkey"));
            }
            other => panic!("Expected Database error, got: {:?}", other),
        }
    }

    #[test]
    fn test_connection_errors_are_transient() {
        let error = DieselError::BrokenTransactionManager;
        let result = DatabaseErrorConverter::convert_diesel_error(error, "load employees");
        assert!(result.is_transient());
    }
}
