//! Bearer token gate for protected routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::jwt::Claims;

/// Scope needed to read employee records.
pub const READ_SCOPE: &str = "read";

/// Scope needed to create, update or delete employee records.
pub const WRITE_SCOPE: &str = "write";

/// Authenticated caller, added to request extensions by [`auth_middleware`]
/// and extracted in handlers with `Extension<AuthUser>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
    pub client_id: String,
    pub scope: Vec<String>,
}

impl AuthUser {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.iter().any(|s| s == scope)
    }

    /// # Errors
    /// `Forbidden` when the token was not granted `scope`
    pub fn require_scope(&self, scope: &str) -> AppResult<()> {
        if self.has_scope(scope) {
            return Ok(());
        }
        tracing::debug!(username = %self.username, scope, "Missing required scope");
        Err(AppError::Forbidden {
            message: format!("insufficient_scope: {} required", scope),
        })
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            client_id: claims.client_id,
            scope: claims.scope,
        }
    }
}

/// Validates `Authorization: Bearer <access token>` and stores the caller as
/// an [`AuthUser`] extension.
///
/// # Errors
/// Returns 401 Unauthorized if the header is missing or malformed, or the
/// token is invalid, expired, or a refresh token.
///
/// # Example
/// ```ignore
/// routes.route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
/// ```
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized {
            message: "Missing authorization header".to_string(),
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .ok_or_else(|| AppError::Unauthorized {
            message: "Invalid authorization header format. Expected: Bearer <token>".to_string(),
        })?;

    let claims = state.services.auth.verify_access_token(token.trim())?;
    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::jwt::TokenType;

    #[test]
    fn test_auth_user_from_claims() {
        let claims = Claims::new(
            "admin",
            "roster-client",
            vec!["read".to_string()],
            TokenType::Access,
            60,
        );

        assert_eq!(
            AuthUser::from(claims),
            AuthUser {
                username: "admin".to_string(),
                client_id: "roster-client".to_string(),
                scope: vec!["read".to_string()],
            }
        );
    }

    #[test]
    fn test_require_scope() {
        let user = AuthUser {
            username: "admin".to_string(),
            client_id: "roster-client".to_string(),
            scope: vec![READ_SCOPE.to_string()],
        };

        assert!(user.require_scope(READ_SCOPE).is_ok());
        match user.require_scope(WRITE_SCOPE) {
            Err(AppError::Forbidden { message }) => assert!(message.contains("write")),
            other => panic!("Expected Forbidden, got {:?}", other),
        }
    }
}
