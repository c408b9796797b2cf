//! Router tests for the media gateway with a stub provider

use std::{
    sync::{Arc, Mutex},
    time::{SystemTime, UNIX_EPOCH},
};

use api::{AppState, cache::PageCache, routes::create_router};
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::token::{Claims, TokenValidator};
use jsonwebtoken::{EncodingKey, Header, encode};
use media::{
    CloudinaryConfig, CloudinaryUploader, MediaItem, MediaKind, MediaPage, MediaProvider,
    ProviderError, SearchQuery,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const SECRET: &str = "gateway-secret";

#[derive(Default)]
struct StubProvider {
    fail: bool,
    calls: Mutex<Vec<(MediaKind, SearchQuery)>>,
}

#[async_trait]
impl MediaProvider for StubProvider {
    async fn search(
        &self,
        kind: MediaKind,
        query: &SearchQuery,
    ) -> Result<MediaPage, ProviderError> {
        self.calls.lock().unwrap().push((kind, query.clone()));

        if self.fail {
            return Err(ProviderError::Status(500));
        }

        Ok(MediaPage {
            items: vec![MediaItem {
                id: "42".to_string(),
                kind,
                source_url: "https://cdn.example/42".to_string(),
                author_label: "Ann".to_string(),
                caption: "Clip".to_string(),
                like_count: 1,
                comment_count: 0,
                liked: false,
            }],
            page: query.page,
            per_page: query.per_page,
            next_page: Some(query.page + 1),
            total_results: 100,
        })
    }
}

fn app_with(provider: Arc<StubProvider>, uploader: Option<CloudinaryUploader>) -> Router {
    create_router(AppState {
        provider,
        uploader,
        cache: PageCache::disabled(),
        tokens: TokenValidator::new(SECRET),
    })
}

fn token_with(secret: &str, lifetime: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let claims = Claims {
        sub: Uuid::new_v4(),
        email: "a@b.com".to_string(),
        iat: now,
        exp: (now as i64 + lifetime) as u64,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn token() -> String {
    token_with(SECRET, 3600)
}

async fn get(app: &Router, uri: &str, bearer: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::get(uri);
    if let Some(bearer) = bearer {
        request = request.header(header::AUTHORIZATION, format!("Bearer {bearer}"));
    }

    let response = app
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_search_requires_token() {
    let provider = Arc::new(StubProvider::default());
    let app = app_with(provider.clone(), None);

    let (status, body) = get(&app, "/api/videos", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = get(&app, "/api/videos", Some(&token_with("other", 3600))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(&app, "/api/videos", Some(&token_with(SECRET, -60))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(provider.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_video_search_normalizes_query() {
    let provider = Arc::new(StubProvider::default());
    let app = app_with(provider.clone(), None);

    let (status, body) = get(
        &app,
        "/api/videos?query=ocean&page=2&per_page=500",
        Some(&token()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 2);
    assert_eq!(body["perPage"], 80);
    assert_eq!(body["nextPage"], 3);
    assert_eq!(body["items"][0]["sourceUrl"], "https://cdn.example/42");

    let calls = provider.calls.lock().unwrap();
    assert_eq!(calls[0].0, MediaKind::Video);
    assert_eq!(calls[0].1.query, "ocean");
}

#[tokio::test]
async fn test_photo_search_uses_defaults() {
    let provider = Arc::new(StubProvider::default());
    let app = app_with(provider.clone(), None);

    let (status, body) = get(&app, "/api/photos", Some(&token())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["kind"], "photo");

    let calls = provider.calls.lock().unwrap();
    assert_eq!(calls[0].1, SearchQuery::new(None, None, None));
}

#[tokio::test]
async fn test_malformed_query_is_bad_request() {
    let app = app_with(Arc::new(StubProvider::default()), None);

    let (status, body) = get(&app, "/api/videos?page=abc", Some(&token())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_provider_failure_is_service_unavailable() {
    let provider = Arc::new(StubProvider {
        fail: true,
        ..Default::default()
    });
    let app = app_with(provider, None);

    let (status, body) = get(&app, "/api/videos", Some(&token())).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "provider_unavailable");
}

fn upload_request(content_type: &str, body: &'static [u8]) -> Request<Body> {
    Request::post("/api/videos/upload")
        .header(header::AUTHORIZATION, format!("Bearer {}", token()))
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_upload_forwards_clip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo/video/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"secure_url": "https://res.example/clip.mp4"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let uploader = CloudinaryUploader::new(CloudinaryConfig {
        cloud_name: "demo".to_string(),
        upload_preset: "unsigned".to_string(),
        base_url: server.uri(),
        timeout_secs: 5,
    })
    .unwrap();
    let app = app_with(Arc::new(StubProvider::default()), Some(uploader));

    let (status, body) = send(&app, upload_request("video/mp4", b"clip")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "https://res.example/clip.mp4");
}

#[tokio::test]
async fn test_upload_rejections() {
    let app = app_with(Arc::new(StubProvider::default()), None);

    let (status, _) = send(&app, upload_request("text/plain", b"clip")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, upload_request("video/mp4", b"")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, upload_request("video/mp4", b"clip")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "upload_failed");
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app_with(Arc::new(StubProvider::default()), None);

    let (status, body) = get(&app, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
