//! Health check endpoint handlers.
//!
//! Health checks talk to the connection pool directly rather than going
//! through the service layer, so a cached listing cannot mask an outage.

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use std::collections::HashMap;
use std::time::Instant;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Creates health check routes.
///
/// # Routes
/// - `GET /health` - Basic health check
/// - `GET /health/ready` - Readiness check
/// - `GET /health/live` - Liveness check
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health_check))
        .routes(routes!(readiness_check))
        .routes(routes!(liveness_check))
}

/// Health report including database and cache status.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut checks = HashMap::new();
    checks.insert("database".to_string(), check_database(&state).await);
    checks.insert("cache".to_string(), check_cache(&state));

    let response = HealthResponse::from_checks(crate::pkg_version(), checks);
    let status = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(response))
}

/// Readiness check endpoint.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Service is not ready")
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match check_database(&state).await.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded | HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Liveness check endpoint. Never touches external dependencies.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive")
    ),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

async fn check_database(state: &AppState) -> ComponentHealth {
    let Some(pool) = &state.db_pool else {
        return ComponentHealth::healthy("In-memory store", None);
    };

    let start_time = Instant::now();
    let elapsed = || Some(start_time.elapsed().as_millis() as u64);

    match pool.get().await {
        Ok(mut conn) => {
            use diesel_async::RunQueryDsl;

            match diesel::sql_query("SELECT 1").execute(&mut conn).await {
                Ok(_) => ComponentHealth::healthy("Connected", elapsed()),
                Err(e) => ComponentHealth::unhealthy(format!("Query failed: {}", e), elapsed()),
            }
        }
        Err(e) => ComponentHealth::unhealthy(format!("Connection failed: {}", e), elapsed()),
    }
}

fn check_cache(state: &AppState) -> ComponentHealth {
    if state.cache.is_enabled() {
        ComponentHealth::healthy("Memory cache enabled", None)
    } else {
        ComponentHealth {
            status: HealthStatus::Degraded,
            message: Some("Cache disabled".to_string()),
            response_time_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn state(cache_enabled: bool) -> AppState {
        let mut settings = Settings::default();
        settings.auth.user.password = "pw".to_string();
        settings.cache.enabled = cache_enabled;
        AppState::in_memory(&settings).unwrap()
    }

    #[tokio::test]
    async fn test_liveness_check() {
        assert_eq!(liveness_check().await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_in_memory_store_is_ready() {
        assert_eq!(readiness_check(State(state(true))).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_disabled_cache_degrades_but_stays_up() {
        let (status, Json(body)) = health_check(State(state(false))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, HealthStatus::Degraded);
        assert_eq!(body.checks["cache"].status, HealthStatus::Degraded);
        assert_eq!(body.checks["database"].status, HealthStatus::Healthy);
    }
}
