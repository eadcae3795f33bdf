//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `employee` - Employee request/response DTOs
//! - `auth` - OAuth2 token endpoint DTOs
//! - `error` - Common error response DTOs
//! - `health` - Health check DTOs

mod auth;
mod employee;
mod error;
mod health;

pub use auth::{TokenRequest, TokenResponse};
pub use employee::{EmployeeRequest, EmployeeResponse};
pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
