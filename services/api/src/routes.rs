//! Media gateway routes

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State, rejection::QueryRejection},
    http::{HeaderMap, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use common::token::AuthUser;
use media::{MediaKind, MediaPage, SearchQuery};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::auth_middleware,
};

/// Largest accepted clip upload
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Search parameters accepted by the media routes
#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    pub query: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Create the router for the media gateway
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/videos", get(search_videos))
        .route("/api/photos", get(search_photos))
        .route(
            "/api/videos/upload",
            post(upload_video).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

async fn search(
    state: &AppState,
    kind: MediaKind,
    params: Result<Query<MediaQuery>, QueryRejection>,
) -> ApiResult<MediaPage> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let query = SearchQuery::new(params.query.as_deref(), params.page, params.per_page);

    if let Some(page) = state.cache.get(kind, &query).await {
        return Ok(page);
    }

    let page = state.provider.search(kind, &query).await?;
    state.cache.put(kind, &query, &page).await;

    Ok(page)
}

/// Search stock videos
pub async fn search_videos(
    State(state): State<AppState>,
    params: Result<Query<MediaQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(search(&state, MediaKind::Video, params).await?))
}

/// Search stock photos
pub async fn search_photos(
    State(state): State<AppState>,
    params: Result<Query<MediaQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(search(&state, MediaKind::Photo, params).await?))
}

/// Forward a recorded clip to the hosted media store
pub async fn upload_video(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .filter(|value| value.starts_with("video/"))
        .ok_or_else(|| ApiError::BadRequest("Content-Type must be a video type".to_string()))?
        .to_string();

    if body.is_empty() {
        return Err(ApiError::BadRequest("Video body is empty".to_string()));
    }

    let uploader = state.uploader.as_ref().ok_or(ApiError::UploadFailed(None))?;

    info!("User {} uploading {} bytes", user.id, body.len());
    let url = uploader.upload(body.to_vec(), &content_type).await?;

    Ok(Json(json!({ "url": url })))
}
