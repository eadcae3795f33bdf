//! OAuth2 token issuance for the single configured client and user.
//!
//! Supports the `password` and `refresh_token` grants. Tokens are HS256 JWTs
//! carrying the username, client id and granted scopes.
//!
//! The client secret and the user password are both held as argon2 hashes, so
//! presented credentials are only ever checked through `verify_password`.

use std::sync::Arc;

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use crate::utils::jwt::{self, Claims, TokenType};
use crate::utils::password::{hash_password, is_password_hash, verify_password};

/// Client credentials presented at the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub id: String,
    pub secret: String,
}

/// A parsed token request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenGrant {
    Password {
        username: String,
        password: String,
        /// Space-delimited scopes; `None` grants all of the client's scopes
        scope: Option<String>,
    },
    RefreshToken {
        refresh_token: String,
    },
}

/// Result of a successful grant.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
    pub scope: Vec<String>,
}

#[derive(Clone)]
pub struct AuthService {
    inner: Arc<AuthInner>,
}

struct AuthInner {
    jwt_secret: String,
    access_validity: u64,
    refresh_validity: u64,
    client_id: String,
    client_secret_hash: String,
    client_scopes: Vec<String>,
    username: String,
    password_hash: String,
}

impl AuthService {
    /// Builds the service, hashing a plaintext client secret or user password.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        Ok(Self {
            inner: Arc::new(AuthInner {
                jwt_secret: config.jwt_secret.clone(),
                access_validity: config.access_token_validity,
                refresh_validity: config.refresh_token_validity,
                client_id: config.client.id.clone(),
                client_secret_hash: credential_hash(&config.client.secret)?,
                client_scopes: config.client.scopes.clone(),
                username: config.user.username.clone(),
                password_hash: credential_hash(&config.user.password)?,
            }),
        })
    }

    /// Issues an access/refresh token pair for an authenticated client.
    ///
    /// # Errors
    /// * `Unauthorized` - bad client credentials, bad user credentials, or an
    ///   invalid refresh token
    /// * `BadRequest` - a requested scope the client does not have
    pub async fn issue(
        &self,
        client: &ClientCredentials,
        grant: TokenGrant,
    ) -> AppResult<IssuedTokens> {
        self.authenticate_client(client).await?;

        let (username, scope) = match grant {
            TokenGrant::Password {
                username,
                password,
                scope,
            } => {
                let scope = self.resolve_scope(scope.as_deref())?;
                self.authenticate_user(username.clone(), password).await?;
                (username, scope)
            }
            TokenGrant::RefreshToken { refresh_token } => {
                let claims = jwt::validate_refresh_token(&refresh_token, &self.inner.jwt_secret)?;
                if claims.client_id != client.id || claims.sub != self.inner.username {
                    return Err(AppError::Unauthorized {
                        message: "Refresh token was not issued to this client".to_string(),
                    });
                }
                (claims.sub, claims.scope)
            }
        };

        let tokens = self.issue_pair(&username, &scope)?;
        tracing::info!(username = %username, client_id = %client.id, "Issued token pair");
        Ok(tokens)
    }

    /// Verifies a bearer token presented to a protected route.
    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        jwt::validate_access_token(token, &self.inner.jwt_secret)
    }

    async fn authenticate_client(&self, client: &ClientCredentials) -> AppResult<()> {
        // The secret is checked even for an unknown id
        let secret_ok = verify_blocking(
            client.secret.clone(),
            self.inner.client_secret_hash.clone(),
        )
        .await?;

        if secret_ok && client.id == self.inner.client_id {
            return Ok(());
        }
        tracing::warn!(client_id = %client.id, "Rejected client credentials");
        Err(AppError::Unauthorized {
            message: "Invalid client credentials".to_string(),
        })
    }

    async fn authenticate_user(&self, username: String, password: String) -> AppResult<()> {
        let password_ok = verify_blocking(password, self.inner.password_hash.clone()).await?;

        if password_ok && username == self.inner.username {
            Ok(())
        } else {
            Err(AppError::Unauthorized {
                message: "Bad credentials".to_string(),
            })
        }
    }

    fn resolve_scope(&self, requested: Option<&str>) -> AppResult<Vec<String>> {
        let allowed = &self.inner.client_scopes;
        let Some(requested) = requested.filter(|s| !s.trim().is_empty()) else {
            return Ok(allowed.clone());
        };

        let mut scope: Vec<String> = Vec::new();
        for item in requested.split_whitespace() {
            if !allowed.iter().any(|a| a == item) {
                return Err(AppError::BadRequest {
                    message: format!("invalid_scope: {}", item),
                });
            }
            if !scope.iter().any(|s| s == item) {
                scope.push(item.to_string());
            }
        }
        Ok(scope)
    }

    fn issue_pair(&self, username: &str, scope: &[String]) -> AppResult<IssuedTokens> {
        let secret = &self.inner.jwt_secret;
        let client_id = &self.inner.client_id;

        let access_token = jwt::generate_token(
            username,
            client_id,
            scope,
            TokenType::Access,
            secret,
            seconds(self.inner.access_validity),
        )?;
        let refresh_token = jwt::generate_token(
            username,
            client_id,
            scope,
            TokenType::Refresh,
            secret,
            seconds(self.inner.refresh_validity),
        )?;

        Ok(IssuedTokens {
            access_token,
            refresh_token,
            expires_in: self.inner.access_validity,
            scope: scope.to_vec(),
        })
    }
}

/// Keeps PHC strings as configured and hashes anything else.
fn credential_hash(configured: &str) -> AppResult<String> {
    if is_password_hash(configured) {
        Ok(configured.to_string())
    } else {
        hash_password(configured)
    }
}

/// Runs argon2 verification off the async executor.
async fn verify_blocking(presented: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&presented, &hash))
        .await
        .map_err(|e| AppError::Internal {
            source: anyhow::Error::from(e),
        })?
}

fn seconds(validity: u64) -> i64 {
    i64::try_from(validity).unwrap_or(i64::MAX)
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("client_id", &self.inner.client_id)
            .field("username", &self.inner.username)
            .finish_non_exhaustive()
    }
}
