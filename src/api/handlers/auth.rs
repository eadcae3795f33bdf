//! OAuth2 token endpoint.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::AUTH_TAG;
use crate::api::dto::{ErrorResponse, TokenRequest, TokenResponse};
use crate::error::{AppError, AppResult};
use crate::services::ClientCredentials;
use crate::state::AppState;
use crate::utils::validate::ValidatedForm;

/// Creates the token route (`POST /oauth/token`).
pub fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(token))
}

/// POST /oauth/token - Issue tokens
///
/// Supports the `password` and `refresh_token` grants. The client
/// authenticates with HTTP Basic or with `client_id`/`client_secret` fields.
#[utoipa::path(
    post,
    path = "/oauth/token",
    tag = AUTH_TAG,
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Tokens issued", body = TokenResponse),
        (status = 400, description = "Malformed request or unsupported grant", body = ErrorResponse),
        (status = 401, description = "Bad client or user credentials", body = ErrorResponse)
    )
)]
async fn token(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedForm(payload): ValidatedForm<TokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    let client = client_credentials(&headers, &payload)?;
    let grant = payload.to_grant()?;

    let tokens = state.services.auth.issue(&client, grant).await?;
    Ok(Json(tokens.into()))
}

/// Basic credentials win over form fields when both are sent.
fn client_credentials(headers: &HeaderMap, payload: &TokenRequest) -> AppResult<ClientCredentials> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        return parse_basic(value.to_str().unwrap_or_default());
    }

    match (&payload.client_id, &payload.client_secret) {
        (Some(id), Some(secret)) => Ok(ClientCredentials {
            id: id.clone(),
            secret: secret.clone(),
        }),
        _ => Err(AppError::Unauthorized {
            message: "Client authentication required".to_string(),
        }),
    }
}

fn parse_basic(value: &str) -> AppResult<ClientCredentials> {
    let invalid = || AppError::Unauthorized {
        message: "Invalid basic authentication header".to_string(),
    };

    let encoded = value.strip_prefix("Basic ").ok_or_else(invalid)?;
    let decoded = STANDARD.decode(encoded.trim()).map_err(|_| invalid())?;
    let decoded = String::from_utf8(decoded).map_err(|_| invalid())?;
    let (id, secret) = decoded.split_once(':').ok_or_else(invalid)?;

    Ok(ClientCredentials {
        id: id.to_string(),
        secret: secret.to_string(),
    })
}
