//! Custom error types for the media gateway

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use media::{ProviderError, UploadError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Custom error type for the media gateway
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing, malformed or expired bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad request with message
    #[error("{0}")]
    BadRequest(String),

    /// Stock-media provider could not answer
    #[error("Media provider unavailable")]
    ProviderUnavailable(#[from] ProviderError),

    /// Upload not configured or rejected upstream
    #[error("Upload failed")]
    UploadFailed(Option<UploadError>),
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError::UploadFailed(Some(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::ProviderUnavailable(e) => {
                error!("Provider failure: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "provider_unavailable")
            }
            ApiError::UploadFailed(Some(e)) => {
                error!("Upload failure: {}", e);
                (StatusCode::BAD_GATEWAY, "upload_failed")
            }
            ApiError::UploadFailed(None) => {
                warn!("Upload requested but Cloudinary is not configured");
                (StatusCode::SERVICE_UNAVAILABLE, "upload_failed")
            }
        };

        let body = Json(json!({
            "error": code,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
