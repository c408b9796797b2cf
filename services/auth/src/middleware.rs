//! Middleware for bearer token validation

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use common::token::AuthUser;
use tracing::warn;

use crate::{AppState, error::AuthError};

/// Validate the bearer token and expose the caller as an `AuthUser` extension
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AuthError::Unauthorized)?;

    let claims = state
        .auth
        .jwt()
        .validate_token(bearer.token())
        .map_err(|e| {
            warn!("Rejected token: {}", e);
            AuthError::Unauthorized
        })?;

    req.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(req).await)
}
