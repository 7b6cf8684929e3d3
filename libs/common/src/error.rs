//! Custom error types for the common library
//!
//! This module defines application-specific error types that can be used
//! throughout the application.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred while creating the schema
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Errors raised while touching a user's namespace directory
#[derive(Error, Debug)]
pub enum NamespaceError {
    /// The user's directory does not exist
    #[error("User folder not found")]
    NotFound,

    /// The requested file does not exist inside the namespace
    #[error("File not found")]
    FileNotFound,

    /// The filename is empty or path-like
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    /// Underlying filesystem failure
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result with NamespaceError
pub type NamespaceResult<T> = Result<T, NamespaceError>;
