//! Custom error types for the API service

use auth::AuthError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::NamespaceError;
use media::DownloaderError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// No session token header
    #[error("Token is missing!")]
    AuthMissing,

    /// Bad, expired or orphaned session token
    #[error("Token is invalid!")]
    AuthInvalid,

    /// Username already registered
    #[error("User already exists")]
    AlreadyExists,

    /// Login failed
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bad request with message
    #[error("{0}")]
    BadRequest(String),

    /// Missing user folder or file
    #[error("{0}")]
    NotFound(String),

    /// Filesystem failure, surfaced with its message
    #[error("{0}")]
    Io(String),

    /// The downloader did not finish in time
    #[error("{0}")]
    DownloaderTimeout(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::AuthMissing | ApiError::AuthInvalid => StatusCode::FORBIDDEN,
            ApiError::AlreadyExists | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DownloaderTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Io(_) | ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AlreadyExists => ApiError::AlreadyExists,
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::Validation(msg) => ApiError::BadRequest(msg),
            AuthError::Namespace(_) => {
                error!("{}", err);
                ApiError::Io(err.to_string())
            }
            AuthError::Database(_) | AuthError::PasswordHash(_) => {
                error!("{}", err);
                ApiError::InternalServerError
            }
        }
    }
}

impl From<NamespaceError> for ApiError {
    fn from(err: NamespaceError) -> Self {
        match err {
            NamespaceError::NotFound | NamespaceError::FileNotFound => {
                ApiError::NotFound(err.to_string())
            }
            NamespaceError::InvalidFilename(_) => ApiError::BadRequest(err.to_string()),
            NamespaceError::Io(e) => {
                error!("Filesystem error: {}", e);
                ApiError::Io(format!("Filesystem error: {}", e))
            }
        }
    }
}

impl From<DownloaderError> for ApiError {
    fn from(err: DownloaderError) -> Self {
        error!("{}", err);
        match err {
            DownloaderError::TimedOut(_) => ApiError::DownloaderTimeout(err.to_string()),
            DownloaderError::Spawn(_) => ApiError::Io(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
