//! Authentication service routes

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use common::token::AuthUser;
use serde::Serialize;
use serde_json::json;

use crate::{
    AppState,
    error::AuthError,
    middleware::auth_middleware,
    models::{Credentials, ProfileImage, PublicUser},
};

/// Largest accepted profile image
pub const MAX_PROFILE_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Raster formats accepted as profile images
pub const PROFILE_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Response for user login
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub expires_in: u64,
    pub user: PublicUser,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/auth/me", get(current_user))
        .route(
            "/api/auth/me/profile-image",
            get(get_profile_image)
                .put(put_profile_image)
                .layer(DefaultBodyLimit::max(MAX_PROFILE_IMAGE_BYTES)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// User registration endpoint
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> Result<impl IntoResponse, AuthError> {
    state.auth.register(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "User registered successfully"})),
    ))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> Result<impl IntoResponse, AuthError> {
    let outcome = state.auth.login(payload).await?;

    Ok(Json(LoginResponse {
        message: "Login successful",
        token: outcome.token.token,
        expires_in: outcome.token.expires_in,
        user: outcome.user,
    }))
}

/// Public profile of the authenticated user
pub async fn current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AuthError> {
    Ok(Json(state.auth.current_user(user.id).await?))
}

/// Replace the authenticated user's profile image
pub async fn put_profile_image(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AuthError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|essence| essence.trim().to_ascii_lowercase())
        .filter(|essence| PROFILE_IMAGE_TYPES.contains(&essence.as_str()))
        .ok_or_else(|| {
            AuthError::Validation(
                "Content-Type must be image/jpeg, image/png, image/gif or image/webp".to_string(),
            )
        })?;

    if body.is_empty() {
        return Err(AuthError::Validation("Image body is empty".to_string()));
    }

    state
        .auth
        .set_profile_image(
            user.id,
            ProfileImage {
                data: body.to_vec(),
                content_type,
            },
        )
        .await?;

    Ok(Json(json!({"message": "Profile image updated"})))
}

/// Download the authenticated user's profile image
pub async fn get_profile_image(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AuthError> {
    let image = state.auth.profile_image(user.id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, image.content_type),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
        ],
        image.data,
    ))
}
