//! Authentication middleware for session token validation

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{self, Header},
    typed_header::TypedHeaderRejection,
};
use tracing::{debug, error};

use crate::{error::ApiError, state::AppState};

static X_ACCESS_TOKEN: HeaderName = HeaderName::from_static("x-access-token");

/// The `x-access-token` request header carrying a session token
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);

impl Header for AccessToken {
    fn name() -> &'static HeaderName {
        &X_ACCESS_TOKEN
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let token = values
            .next()
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(headers::Error::invalid)?;

        Ok(Self(token.to_string()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            values.extend(std::iter::once(value));
        }
    }
}

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

/// Authentication middleware
///
/// Verifies the session token, resolves it to a stored user and hands the
/// identity to the handler as an [`AuthUser`] extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    token: Result<TypedHeader<AccessToken>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(AccessToken(token)) = token.map_err(|rejection| {
        if rejection.is_missing() {
            ApiError::AuthMissing
        } else {
            ApiError::AuthInvalid
        }
    })?;

    let user_id = state
        .jwt_service
        .verify(&token)
        .map_err(|_| ApiError::AuthInvalid)?;

    let user = state
        .user_repository
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            error!("Failed to load user {}: {}", user_id, e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| {
            debug!("Token references unknown user {}", user_id);
            ApiError::AuthInvalid
        })?;

    // Insert the user into the request extensions
    req.extensions_mut().insert(AuthUser {
        id: user.id,
        username: user.username,
    });

    Ok(next.run(req).await)
}
