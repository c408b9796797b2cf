//! Custom error types for the common library

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Errors raised while validating a session token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Signature valid but the expiry has passed
    #[error("Token expired")]
    Expired,

    /// Malformed token, bad signature or missing claims
    #[error("Invalid token")]
    Invalid,

    /// Secret unusable for signing or verification
    #[error("Token configuration error: {0}")]
    Configuration(String),
}
