//! Error type for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::repositories::StoreError;

/// Failures surfaced by authentication operations
#[derive(Error, Debug)]
pub enum AuthError {
    /// Request body failed validation
    #[error("{0}")]
    Validation(String),

    /// Email already registered
    #[error("User already exists")]
    DuplicateUser,

    /// Unknown email or wrong password; intentionally indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Too many failed logins for this email
    #[error("Too many failed attempts, try again later")]
    TooManyAttempts,

    /// Missing, malformed or expired bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Requested resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Unexpected failure; details are logged, never returned
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "validation_failed",
            AuthError::DuplicateUser => "duplicate_user",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::TooManyAttempts => "too_many_attempts",
            AuthError::Unauthorized => "unauthorized",
            AuthError::NotFound(_) => "not_found",
            AuthError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::DuplicateUser => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AuthError::DuplicateUser,
            StoreError::Database(e) => AuthError::Internal(e.into()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match &self {
            AuthError::Internal(e) => {
                error!("Internal error: {:#}", e);
                "Server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": self.code(),
            "message": message,
        }));

        (self.status(), body).into_response()
    }
}

/// Type alias for authentication results
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::DuplicateUser.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Internal(anyhow::anyhow!("boom"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_duplicate_maps_to_duplicate_user() {
        assert!(matches!(
            AuthError::from(StoreError::Duplicate),
            AuthError::DuplicateUser
        ));
    }
}
