//! Error types for credential handling

use common::error::NamespaceError;
use thiserror::Error;

/// Errors raised by the credential store
#[derive(Error, Debug)]
pub enum AuthError {
    /// The username is already registered
    #[error("User already exists")]
    AlreadyExists,

    /// Unknown username or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Rejected input
    #[error("{0}")]
    Validation(String),

    /// Database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Hashing or hash parsing failure
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// The user's folder could not be created
    #[error("Failed to create user folder: {0}")]
    Namespace(#[from] NamespaceError),
}

/// Type alias for Result with AuthError
pub type AuthResult<T> = Result<T, AuthError>;
