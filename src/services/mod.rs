//! Service layer for business logic operations.

mod auth_service;
mod employee_service;

pub use auth_service::{AuthService, ClientCredentials, IssuedTokens, TokenGrant};
pub use employee_service::{ALL_KEY, EMPLOYEES_REGION, EmployeeService};

use crate::cache::CacheManager;
use crate::config::AuthConfig;
use crate::error::AppResult;
use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
///
/// Cloning is cheap; everything inside is reference counted.
#[derive(Clone)]
pub struct Services {
    pub employees: EmployeeService,
    pub auth: AuthService,
}

impl Services {
    pub fn new(repos: Repositories, cache: &CacheManager, auth: &AuthConfig) -> AppResult<Self> {
        Ok(Self {
            employees: EmployeeService::new(repos.employees, cache),
            auth: AuthService::new(auth)?,
        })
    }
}
