//! Employee CRUD request handlers.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::EMPLOYEE_TAG;
use crate::api::dto::{EmployeeRequest, EmployeeResponse, ErrorResponse};
use crate::api::middleware::{AuthUser, READ_SCOPE, WRITE_SCOPE};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates employee routes. All of them require a bearer token; the caller
/// layers the auth middleware on top. Reads need the `read` scope, writes
/// the `write` scope.
///
/// Routes:
/// - GET    /api/v1/employees       - List all employees
/// - POST   /api/v1/employees       - Create a new employee
/// - GET    /api/v1/employees/{id}  - Get employee by ID
/// - PUT    /api/v1/employees/{id}  - Replace employee by ID
/// - DELETE /api/v1/employees/{id}  - Delete employee by ID
pub fn employee_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_employees, create_employee))
        .routes(routes!(get_employee, update_employee, delete_employee))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    tag = EMPLOYEE_TAG,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "All employees", body = [EmployeeResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Token lacks the required scope", body = ErrorResponse)
    )
)]
async fn list_employees(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<EmployeeResponse>>> {
    user.require_scope(READ_SCOPE)?;
    let employees = state.services.employees.list().await?;
    Ok(Json(
        employees.into_iter().map(EmployeeResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    tag = EMPLOYEE_TAG,
    security(("bearerAuth" = [])),
    params(("id" = i64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "The employee", body = EmployeeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Token lacks the required scope", body = ErrorResponse),
        (status = 404, description = "No employee with this id", body = ErrorResponse)
    )
)]
async fn get_employee(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<EmployeeResponse>> {
    user.require_scope(READ_SCOPE)?;
    let employee = state.services.employees.get(id).await?;
    Ok(Json(employee.into()))
}

/// A body `id` is rejected; ids are assigned by the store.
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    tag = EMPLOYEE_TAG,
    security(("bearerAuth" = [])),
    request_body = EmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = EmployeeResponse),
        (status = 400, description = "Invalid body or id supplied", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Token lacks the required scope", body = ErrorResponse)
    )
)]
async fn create_employee(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<EmployeeRequest>,
) -> AppResult<(StatusCode, Json<EmployeeResponse>)> {
    user.require_scope(WRITE_SCOPE)?;
    let employee = state
        .services
        .employees
        .create(payload.into_new_employee())
        .await?;
    Ok((StatusCode::CREATED, Json(employee.into())))
}

/// Replaces every field; a body `id` is ignored in favour of the path.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}",
    tag = EMPLOYEE_TAG,
    security(("bearerAuth" = [])),
    params(("id" = i64, Path, description = "Employee id")),
    request_body = EmployeeRequest,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Token lacks the required scope", body = ErrorResponse),
        (status = 404, description = "No employee with this id", body = ErrorResponse)
    )
)]
async fn update_employee(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<EmployeeRequest>,
) -> AppResult<Json<EmployeeResponse>> {
    user.require_scope(WRITE_SCOPE)?;
    let employee = state
        .services
        .employees
        .update(id, payload.into_new_employee())
        .await?;
    Ok(Json(employee.into()))
}

/// Deleting an id that does not exist still answers 204.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    tag = EMPLOYEE_TAG,
    security(("bearerAuth" = [])),
    params(("id" = i64, Path, description = "Employee id")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Token lacks the required scope", body = ErrorResponse)
    )
)]
async fn delete_employee(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    user.require_scope(WRITE_SCOPE)?;
    state.services.employees.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
