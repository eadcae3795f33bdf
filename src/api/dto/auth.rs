//! OAuth2 token endpoint DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::{IssuedTokens, TokenGrant};

/// Form body of `POST /oauth/token`.
///
/// Which fields are required depends on `grant_type`. Client credentials may
/// be sent here instead of an HTTP Basic header.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TokenRequest {
    #[validate(length(min = 1, message = "grant_type is required"))]
    #[schema(example = "password")]
    pub grant_type: String,
    #[schema(example = "admin")]
    pub username: Option<String>,
    #[schema(format = "password")]
    pub password: Option<String>,
    /// Space-delimited scopes
    #[schema(example = "read write")]
    pub scope: Option<String>,
    pub refresh_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl TokenRequest {
    /// Parses the grant, checking the fields it needs are present.
    pub fn to_grant(&self) -> AppResult<TokenGrant> {
        match self.grant_type.as_str() {
            "password" => Ok(TokenGrant::Password {
                username: required(&self.username, "username")?,
                password: required(&self.password, "password")?,
                scope: self.scope.clone(),
            }),
            "refresh_token" => Ok(TokenGrant::RefreshToken {
                refresh_token: required(&self.refresh_token, "refresh_token")?,
            }),
            other => Err(AppError::BadRequest {
                message: format!("unsupported_grant_type: {}", other),
            }),
        }
    }
}

fn required(value: &Option<String>, name: &str) -> AppResult<String> {
    value
        .clone()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest {
            message: format!("invalid_request: missing {}", name),
        })
}

/// Successful token response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub refresh_token: String,
    /// Access token lifetime in seconds
    #[schema(example = 2000)]
    pub expires_in: u64,
    #[schema(example = "read write")]
    pub scope: String,
}

impl From<IssuedTokens> for TokenResponse {
    fn from(tokens: IssuedTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            token_type: "bearer".to_string(),
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            scope: tokens.scope.join(" "),
        }
    }
}
